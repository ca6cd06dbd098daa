// SPDX-License-Identifier: MIT
//! Bounded wait for job derivation after repo creation.
//!
//! The server derives a new repo's job records asynchronously, so a freshly
//! created repo legitimately shows zero jobs for a while. "Zero jobs" is
//! ambiguous between "not derived yet" and "genuinely has none"; this loop
//! resolves the ambiguity by giving the server a fixed window. It never
//! blocks indefinitely and never treats an exhausted window as an error.

use std::time::Duration;

use tracing::{debug, warn};

use super::CompassStore;

pub const DEFAULT_POLL_ATTEMPTS: u32 = 6;
pub const DEFAULT_POLL_DELAY_MS: u64 = 2000;

/// Attempt budget and inter-attempt delay for the convergence wait.
///
/// Fixed spacing, not exponential backoff: the wait is for a background
/// derivation of known, short duration, not for a flaky upstream.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Maximum number of check-then-fetch iterations.
    pub attempts: u32,
    /// Pause between iterations.
    pub delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_POLL_ATTEMPTS,
            delay: Duration::from_millis(DEFAULT_POLL_DELAY_MS),
        }
    }
}

impl PollConfig {
    /// Same budget, no real waiting (tests).
    pub fn instant() -> Self {
        Self {
            attempts: DEFAULT_POLL_ATTEMPTS,
            delay: Duration::from_millis(1),
        }
    }
}

impl CompassStore {
    /// Wait for a freshly created repo to gain its derived jobs.
    ///
    /// Each iteration first checks local state, so a repo that already
    /// shows jobs costs no network round-trip. Exhausting the budget is a
    /// silent return: the repo simply stays at zero jobs until something
    /// refreshes again.
    pub(crate) async fn await_repo_jobs(&self, repo_id: i64) {
        for attempt in 1..=self.poll.attempts {
            if self.repo_has_jobs(repo_id).await {
                debug!(repo_id, attempt, "jobs visible");
                return;
            }

            tokio::time::sleep(self.poll.delay).await;

            // A transient refresh failure must not abort the window; the
            // create itself already succeeded remotely.
            if let Err(err) = self.load_repos().await {
                warn!(repo_id, attempt, error = %err, "repo refresh failed while awaiting jobs");
            }
        }

        debug!(
            repo_id,
            attempts = self.poll.attempts,
            "job derivation still pending"
        );
    }

    async fn repo_has_jobs(&self, repo_id: i64) -> bool {
        self.state
            .read()
            .await
            .repos
            .iter()
            .any(|repo| repo.id == repo_id && !repo.jobs.is_empty())
    }
}
