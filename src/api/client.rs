//! Domain client: store intents mapped onto fixed endpoint paths.
//!
//! Performs no state mutation; the store owns all state. [`CompassApi`] is
//! the seam that lets tests drive the store with a scripted implementation
//! instead of a live server.

use async_trait::async_trait;

use super::http::{ApiError, Http};
use super::types::{
    CompassStatus, Credential, CredentialPayload, DeleteCredentialOptions, DeleteRepoOptions,
    Repo, RepoPayload,
};

/// The remote operations the store depends on.
#[async_trait]
pub trait CompassApi: Send + Sync {
    async fn list_credentials(&self) -> Result<Vec<Credential>, ApiError>;

    /// The server may answer with the created credential or with nothing;
    /// the store converges through a list re-fetch either way.
    async fn create_credential(
        &self,
        payload: &CredentialPayload,
    ) -> Result<Option<Credential>, ApiError>;

    async fn delete_credential(
        &self,
        id: i64,
        options: &DeleteCredentialOptions,
    ) -> Result<(), ApiError>;

    async fn list_repos(&self) -> Result<Vec<Repo>, ApiError>;

    async fn create_repo(&self, payload: &RepoPayload) -> Result<Option<Repo>, ApiError>;

    async fn delete_repo(&self, id: i64, options: &DeleteRepoOptions) -> Result<(), ApiError>;

    /// One-way trigger asking the server to re-sync a repo against its
    /// source and the orchestrator. No payload, no response document.
    async fn reconcile_repo(&self, id: i64) -> Result<(), ApiError>;

    async fn fetch_status(&self) -> Result<CompassStatus, ApiError>;

    /// Plain-text liveness probe; any 2xx counts.
    async fn ping(&self) -> Result<(), ApiError>;
}

/// Live implementation against a Compass server.
#[derive(Debug, Clone)]
pub struct HttpApi {
    http: Http,
}

impl HttpApi {
    pub fn new(http: Http) -> Self {
        Self { http }
    }
}

#[async_trait]
impl CompassApi for HttpApi {
    async fn list_credentials(&self) -> Result<Vec<Credential>, ApiError> {
        self.http.get("/api/credentials").await
    }

    async fn create_credential(
        &self,
        payload: &CredentialPayload,
    ) -> Result<Option<Credential>, ApiError> {
        self.http.post("/api/credentials", payload).await
    }

    async fn delete_credential(
        &self,
        id: i64,
        options: &DeleteCredentialOptions,
    ) -> Result<(), ApiError> {
        self.http
            .delete(&format!("/api/credentials/{id}"), options)
            .await
    }

    async fn list_repos(&self) -> Result<Vec<Repo>, ApiError> {
        self.http.get("/api/repos").await
    }

    async fn create_repo(&self, payload: &RepoPayload) -> Result<Option<Repo>, ApiError> {
        self.http.post("/api/repos", payload).await
    }

    async fn delete_repo(&self, id: i64, options: &DeleteRepoOptions) -> Result<(), ApiError> {
        self.http.delete(&format!("/api/repos/{id}"), options).await
    }

    async fn reconcile_repo(&self, id: i64) -> Result<(), ApiError> {
        self.http
            .post_empty(&format!("/api/repos/{id}/reconcile"))
            .await
    }

    async fn fetch_status(&self) -> Result<CompassStatus, ApiError> {
        self.http.get("/api/status").await
    }

    async fn ping(&self) -> Result<(), ApiError> {
        self.http.get_ok("/api/health").await
    }
}
