//! Wire models for the Compass server API.
//!
//! Fields mirror the server's JSON verbatim (snake_case). Orchestrator-
//! reported job fields are opaque pass-through values: the client stores
//! and renders them but never interprets them. Sequences that may be absent
//! from a payload decode to empty via `#[serde(default)]` so downstream code
//! never sees a missing collection.

use serde::{Deserialize, Serialize};

/// Stored authentication material for source-control access.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub id: i64,
    /// Display label; not guaranteed unique.
    pub name: String,
    /// Auth mechanism discriminator (e.g. "token", "ssh_key"). Opaque here.
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// A tracked source repository plus its derived deployable jobs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Repo {
    pub id: i64,
    pub name: String,
    pub repo_url: String,
    pub branch: String,
    #[serde(default)]
    pub job_path: String,
    /// Weak reference to a [`Credential`]; a dangling id is tolerated and
    /// rendered as "none".
    pub credential_id: Option<i64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub last_commit: Option<String>,
    pub last_commit_author: Option<String>,
    pub last_commit_title: Option<String>,
    pub last_polled_at: Option<String>,
    /// Empty for a bounded period after creation; the server derives job
    /// records asynchronously.
    #[serde(default)]
    pub jobs: Vec<RepoJob>,
}

/// One deployable unit derived from a repo's contents, with
/// orchestrator-observed status. Scoped to its owning [`Repo`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoJob {
    pub path: String,
    pub job_id: Option<String>,
    pub job_name: Option<String>,
    pub namespace: Option<String>,
    pub job_type: Option<String>,
    pub last_commit: Option<String>,
    #[serde(default)]
    pub updated_at: String,
    pub status: Option<String>,
    pub status_description: Option<String>,
    pub status_error: Option<String>,
    pub nomad_status: Option<String>,
    pub desired_allocations: Option<i64>,
    pub running_allocations: Option<i64>,
    pub starting_allocations: Option<i64>,
    pub queued_allocations: Option<i64>,
    pub failed_allocations: Option<i64>,
    pub lost_allocations: Option<i64>,
    pub unknown_allocations: Option<i64>,
    pub latest_deployment_id: Option<String>,
    pub latest_allocation_id: Option<String>,
    pub latest_allocation_name: Option<String>,
    pub job_url: Option<String>,
    #[serde(default)]
    pub allocations: Vec<AllocationStatus>,
}

/// Orchestrator allocation detail attached to a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationStatus {
    pub id: String,
    pub name: Option<String>,
    pub client: Option<String>,
    pub status: Option<String>,
    pub desired: Option<String>,
    pub group: Option<String>,
    pub healthy: Option<bool>,
}

/// Health of the downstream orchestrator connection. A singleton value,
/// replaced wholesale on each status fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompassStatus {
    pub nomad_connected: bool,
    pub nomad_message: Option<String>,
}

/// Request body for creating a credential.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialPayload {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
}

/// Request body for creating a repo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoPayload {
    pub name: String,
    pub repo_url: String,
    pub branch: String,
    pub job_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<i64>,
}

/// Cascade options for credential deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteCredentialOptions {
    /// Also delete repos that reference this credential.
    pub delete_repos: bool,
    /// Unschedule the deleted repos' jobs from the orchestrator.
    pub unschedule: bool,
}

/// Options for repo deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteRepoOptions {
    /// Unschedule the repo's jobs from the orchestrator.
    pub unschedule: bool,
}
