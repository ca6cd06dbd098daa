//! Client synchronization store.
//!
//! Single source of truth for the collections fetched from the Compass
//! server, and the orchestration of every mutating operation: set a busy
//! flag, call the remote API, re-fetch the affected collections, release
//! the flag. The store never mutates a collection optimistically: local
//! state only changes by absorbing confirmed server state.
//!
//! Busy flags and the id-scoped markers are advisory, UI-facing indicators,
//! not locks: nothing stops a caller that ignores them from issuing
//! overlapping operations. Consumers read cloned [`snapshot`]s; only the
//! action methods on [`CompassStore`] write.
//!
//! [`snapshot`]: CompassStore::snapshot

pub mod poll;

pub use poll::PollConfig;

use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::{
    ApiError, CompassApi, CompassStatus, Credential, CredentialPayload, DeleteCredentialOptions,
    DeleteRepoOptions, Repo, RepoPayload,
};

const UNEXPECTED_ERROR: &str = "Unexpected error";

/// Everything a view needs to render, as one cloneable value.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub credentials: Vec<Credential>,
    pub repos: Vec<Repo>,
    /// Orchestrator connectivity; `None` until the first status fetch lands.
    pub status: Option<CompassStatus>,
    /// Last failure surface. Overwritten, never queued; persists until
    /// cleared or replaced.
    pub error: Option<String>,
    pub refreshing: bool,
    pub saving_credential: bool,
    pub saving_repo: bool,
    /// Id currently being reconciled, if any.
    pub syncing_repo_id: Option<i64>,
    pub deleting_repo_id: Option<i64>,
    pub deleting_credential_id: Option<i64>,
}

/// The synchronization store. Construct once at startup and share.
pub struct CompassStore {
    api: Arc<dyn CompassApi>,
    poll: PollConfig,
    state: RwLock<StoreState>,
}

impl CompassStore {
    pub fn new(api: Arc<dyn CompassApi>) -> Self {
        Self::with_poll(api, PollConfig::default())
    }

    /// Construct with an explicit polling configuration (tests use
    /// [`PollConfig::instant`]).
    pub fn with_poll(api: Arc<dyn CompassApi>, poll: PollConfig) -> Self {
        Self {
            api,
            poll,
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Read-only view of the current state.
    pub async fn snapshot(&self) -> StoreState {
        self.state.read().await.clone()
    }

    /// Re-fetch credentials, repos, and status concurrently.
    ///
    /// Partial-failure tolerant: each fetch writes its slice as it
    /// completes, with no rollback. On all-success the error slot is
    /// cleared; on any failure the first error (in credentials, repos,
    /// status order) is recorded. Never propagates, since no single caller
    /// owns a bulk refresh.
    pub async fn refresh_all(&self) {
        self.state.write().await.refreshing = true;
        debug!("refreshing all collections");

        let (credentials, repos, status) = tokio::join!(
            self.load_credentials(),
            self.load_repos(),
            self.load_status(),
        );
        let failure = [credentials, repos, status]
            .into_iter()
            .find_map(Result::err);

        let mut state = self.state.write().await;
        match &failure {
            None => state.error = None,
            Some(err) => {
                warn!(error = %err, "refresh failed");
                state.error = Some(normalize_error(err));
            }
        }
        state.refreshing = false;
    }

    /// Fetch the credential collection and replace it wholesale.
    pub async fn load_credentials(&self) -> Result<(), ApiError> {
        let credentials = self.api.list_credentials().await?;
        self.state.write().await.credentials = credentials;
        Ok(())
    }

    /// Fetch the repo collection and replace it wholesale. A repo whose job
    /// sequence is absent from the payload decodes to an empty sequence, so
    /// consumers never see a missing collection.
    pub async fn load_repos(&self) -> Result<(), ApiError> {
        let repos = self.api.list_repos().await?;
        self.state.write().await.repos = repos;
        Ok(())
    }

    /// Fetch orchestrator status and replace it wholesale.
    pub async fn load_status(&self) -> Result<(), ApiError> {
        let status = self.api.fetch_status().await?;
        self.state.write().await.status = Some(status);
        Ok(())
    }

    /// Create a credential, then re-fetch the collection to absorb the
    /// server-assigned id and timestamps.
    pub async fn create_credential(&self, payload: CredentialPayload) -> Result<(), ApiError> {
        self.state.write().await.saving_credential = true;
        info!(name = %payload.name, kind = %payload.kind, "creating credential");

        let result = async {
            self.api.create_credential(&payload).await?;
            self.load_credentials().await
        }
        .await;

        self.settle(&result, |state| state.saving_credential = false)
            .await;
        result
    }

    /// Delete a credential with cascade options. Deleting a credential may
    /// delete dependent repos, so success triggers a full resync rather
    /// than a credential re-fetch.
    pub async fn delete_credential(
        &self,
        id: i64,
        options: DeleteCredentialOptions,
    ) -> Result<(), ApiError> {
        self.state.write().await.deleting_credential_id = Some(id);
        info!(
            credential_id = id,
            delete_repos = options.delete_repos,
            unschedule = options.unschedule,
            "deleting credential"
        );

        let result = async {
            self.api.delete_credential(id, &options).await?;
            self.refresh_all().await;
            Ok(())
        }
        .await;

        self.settle(&result, |state| state.deleting_credential_id = None)
            .await;
        result
    }

    /// Create a repo, re-fetch the collection, then wait (bounded) for the
    /// server to derive the repo's jobs. The saving flag is held for the
    /// entire wait: the caller perceives "saving" as lasting through the
    /// eventual-consistency window, not just the initial write.
    pub async fn create_repo(&self, payload: RepoPayload) -> Result<(), ApiError> {
        self.state.write().await.saving_repo = true;
        info!(name = %payload.name, url = %payload.repo_url, "creating repo");

        let result = async {
            let created = self.api.create_repo(&payload).await?;
            self.load_repos().await?;
            if let Some(repo) = created {
                self.await_repo_jobs(repo.id).await;
            }
            Ok(())
        }
        .await;

        self.settle(&result, |state| state.saving_repo = false).await;
        result
    }

    /// Fire a reconcile trigger, then re-fetch repos to pick up whatever
    /// the reconcile changed.
    pub async fn trigger_reconcile(&self, id: i64) -> Result<(), ApiError> {
        self.state.write().await.syncing_repo_id = Some(id);
        info!(repo_id = id, "triggering reconcile");

        let result = async {
            self.api.reconcile_repo(id).await?;
            self.load_repos().await
        }
        .await;

        self.settle(&result, |state| state.syncing_repo_id = None)
            .await;
        result
    }

    /// Delete a repo, then re-fetch the collection.
    pub async fn delete_repo(&self, id: i64, options: DeleteRepoOptions) -> Result<(), ApiError> {
        self.state.write().await.deleting_repo_id = Some(id);
        info!(repo_id = id, unschedule = options.unschedule, "deleting repo");

        let result = async {
            self.api.delete_repo(id, &options).await?;
            self.load_repos().await
        }
        .await;

        self.settle(&result, |state| state.deleting_repo_id = None)
            .await;
        result
    }

    /// Normalize any failure into a display string and record it,
    /// overwriting the previous message. Total; never panics.
    pub async fn set_error(&self, err: &dyn fmt::Display) {
        self.state.write().await.error = Some(normalize_error(err));
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    /// Record the failure (if any) and release the action's busy flag under
    /// one lock acquisition, so no reader observes a failed action with its
    /// flag still set.
    async fn settle(
        &self,
        result: &Result<(), ApiError>,
        release: impl FnOnce(&mut StoreState),
    ) {
        let mut state = self.state.write().await;
        if let Err(err) = result {
            warn!(error = %err, "action failed");
            state.error = Some(normalize_error(err));
        }
        release(&mut state);
    }
}

/// Display strings pass through verbatim; a blank rendering maps to the
/// fixed fallback.
fn normalize_error(err: &dyn fmt::Display) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        UNEXPECTED_ERROR.to_string()
    } else {
        message
    }
}

#[cfg(test)]
pub(crate) mod support {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::api::{
        ApiError, CompassApi, CompassStatus, Credential, CredentialPayload,
        DeleteCredentialOptions, DeleteRepoOptions, Repo, RepoJob, RepoPayload,
    };

    /// Scripted stand-in for the live API.
    ///
    /// `list_repos` serves the scripted pages in order, repeating the last
    /// page once the script is exhausted. Failure slots are sticky until
    /// cleared.
    #[derive(Default)]
    pub struct MockApi {
        pub credentials: Mutex<Vec<Credential>>,
        pub repo_pages: Mutex<VecDeque<Vec<Repo>>>,
        pub status: Mutex<CompassStatus>,
        pub list_credential_calls: AtomicU32,
        pub list_repo_calls: AtomicU32,
        pub status_calls: AtomicU32,
        pub create_repo_response: Mutex<Option<Repo>>,
        pub fail_create_credential: Mutex<Option<(u16, String)>>,
        pub fail_delete_credential: Mutex<Option<(u16, String)>>,
        pub fail_create_repo: Mutex<Option<(u16, String)>>,
        pub fail_delete_repo: Mutex<Option<(u16, String)>>,
        pub fail_reconcile: Mutex<Option<(u16, String)>>,
        pub fail_status: Mutex<Option<(u16, String)>>,
        pub fail_list_repos: Mutex<Option<(u16, String)>>,
        next_credential_id: AtomicI64,
    }

    impl MockApi {
        pub fn new() -> Self {
            Self {
                next_credential_id: AtomicI64::new(1),
                ..Default::default()
            }
        }

        pub fn server_error(status: u16, message: &str) -> ApiError {
            ApiError::Server {
                status,
                message: message.to_string(),
                payload: None,
            }
        }

        pub fn push_repo_page(&self, page: Vec<Repo>) {
            self.repo_pages.lock().unwrap().push_back(page);
        }

        fn fail_if(slot: &Mutex<Option<(u16, String)>>) -> Result<(), ApiError> {
            match slot.lock().unwrap().as_ref() {
                Some((status, message)) => Err(Self::server_error(*status, message)),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl CompassApi for MockApi {
        async fn list_credentials(&self) -> Result<Vec<Credential>, ApiError> {
            self.list_credential_calls.fetch_add(1, Ordering::Relaxed);
            Ok(self.credentials.lock().unwrap().clone())
        }

        async fn create_credential(
            &self,
            payload: &CredentialPayload,
        ) -> Result<Option<Credential>, ApiError> {
            Self::fail_if(&self.fail_create_credential)?;
            let credential = Credential {
                id: self.next_credential_id.fetch_add(1, Ordering::Relaxed),
                name: payload.name.clone(),
                kind: payload.kind.clone(),
                ..Default::default()
            };
            self.credentials.lock().unwrap().push(credential.clone());
            Ok(Some(credential))
        }

        async fn delete_credential(
            &self,
            id: i64,
            _options: &DeleteCredentialOptions,
        ) -> Result<(), ApiError> {
            Self::fail_if(&self.fail_delete_credential)?;
            self.credentials.lock().unwrap().retain(|c| c.id != id);
            Ok(())
        }

        async fn list_repos(&self) -> Result<Vec<Repo>, ApiError> {
            self.list_repo_calls.fetch_add(1, Ordering::Relaxed);
            Self::fail_if(&self.fail_list_repos)?;
            let mut pages = self.repo_pages.lock().unwrap();
            let page = if pages.len() > 1 {
                pages.pop_front().unwrap_or_default()
            } else {
                pages.front().cloned().unwrap_or_default()
            };
            Ok(page)
        }

        async fn create_repo(&self, _payload: &RepoPayload) -> Result<Option<Repo>, ApiError> {
            Self::fail_if(&self.fail_create_repo)?;
            Ok(self.create_repo_response.lock().unwrap().clone())
        }

        async fn delete_repo(
            &self,
            _id: i64,
            _options: &DeleteRepoOptions,
        ) -> Result<(), ApiError> {
            Self::fail_if(&self.fail_delete_repo)
        }

        async fn reconcile_repo(&self, _id: i64) -> Result<(), ApiError> {
            Self::fail_if(&self.fail_reconcile)
        }

        async fn fetch_status(&self) -> Result<CompassStatus, ApiError> {
            self.status_calls.fetch_add(1, Ordering::Relaxed);
            Self::fail_if(&self.fail_status)?;
            Ok(self.status.lock().unwrap().clone())
        }

        async fn ping(&self) -> Result<(), ApiError> {
            Ok(())
        }
    }

    pub fn repo_with_jobs(id: i64, name: &str, jobs: usize) -> Repo {
        Repo {
            id,
            name: name.to_string(),
            repo_url: format!("https://git.example/{name}"),
            branch: "main".to_string(),
            job_path: ".nomad".to_string(),
            jobs: (0..jobs)
                .map(|i| RepoJob {
                    path: format!("job-{i}.nomad"),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }
}
