//! Everything that talks to the Compass server: wire models, the HTTP
//! transport wrapper, and the domain client that maps store intents onto
//! fixed endpoint paths.

pub mod client;
pub mod http;
pub mod types;

pub use client::{CompassApi, HttpApi};
pub use http::{ApiError, Http};
pub use types::{
    AllocationStatus, CompassStatus, Credential, CredentialPayload, DeleteCredentialOptions,
    DeleteRepoOptions, Repo, RepoJob, RepoPayload,
};
