//! Compass client library.
//!
//! The canonical in-memory view of a Compass deployment server: wire models
//! and domain client (`api`), the synchronization store that owns fetched
//! state and orchestrates every mutating operation (`store`), layered
//! configuration (`config`), and the pure presentation helpers the CLI
//! renders with (`format`).

pub mod api;
pub mod cli;
pub mod config;
pub mod format;
pub mod store;

pub use api::{ApiError, CompassApi, HttpApi};
pub use store::{CompassStore, PollConfig, StoreState};
