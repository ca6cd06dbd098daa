// SPDX-License-Identifier: MIT
//! Job status presentation: label, severity, tooltip.
//!
//! Status fields are orchestrator-reported and opaque to the store; the
//! mapping here is purely cosmetic. An unrecognized status is capitalized
//! and shown as-is rather than hidden.

use crate::api::RepoJob;

/// Coarse severity bucket for a job's status, used to pick a glyph or color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSeverity {
    Healthy,
    Pending,
    Warning,
    Danger,
    Unknown,
}

impl JobSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Pending => "pending",
            Self::Warning => "warning",
            Self::Danger => "danger",
            Self::Unknown => "unknown",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Healthy => "●",
            Self::Pending => "◐",
            Self::Warning => "▲",
            Self::Danger => "✗",
            Self::Unknown => "?",
        }
    }
}

impl std::fmt::Display for JobSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short human label for a job's state.
pub fn job_status_label(job: &RepoJob) -> String {
    if has_text(&job.status_error) {
        return "Error".to_string();
    }

    let status = effective_status(job);
    match status.as_str() {
        "healthy" => "Healthy".to_string(),
        "deploying" => "Deploying".to_string(),
        "degraded" => "Degraded".to_string(),
        "failed" => "Failed".to_string(),
        "lost" => "Lost".to_string(),
        "pending" => "Pending".to_string(),
        "dead" => "Stopped".to_string(),
        "missing" => "Missing".to_string(),
        _ => {
            if !has_text(&job.job_id) {
                "Pending".to_string()
            } else if status.is_empty() {
                "Unknown".to_string()
            } else {
                capitalize(&status)
            }
        }
    }
}

/// Severity bucket backing the label.
pub fn job_status_severity(job: &RepoJob) -> JobSeverity {
    if has_text(&job.status_error) {
        return JobSeverity::Danger;
    }

    let status = effective_status(job);
    match status.as_str() {
        "healthy" | "running" | "successful" | "complete" => JobSeverity::Healthy,
        "deploying" | "pending" | "queued" | "evaluating" | "starting" | "recovering"
        | "restarting" | "initializing" | "rolling" | "updating" | "allocating" => {
            JobSeverity::Pending
        }
        "degraded" => JobSeverity::Warning,
        "failed" | "dead" | "lost" | "missing" | "cancelled" => JobSeverity::Danger,
        _ => JobSeverity::Unknown,
    }
}

/// One-line detail for the status: the error if there is one, else the
/// orchestrator's description, else a registration hint.
pub fn job_status_tooltip(job: &RepoJob) -> String {
    if let Some(error) = job.status_error.as_deref().filter(|v| !v.is_empty()) {
        return error.to_string();
    }
    if let Some(description) = job.status_description.as_deref().filter(|v| !v.is_empty()) {
        return description.to_string();
    }
    if let Some(nomad_status) = job.nomad_status.as_deref().filter(|v| !v.is_empty()) {
        return format!("Nomad status: {}", capitalize(nomad_status));
    }
    if !has_text(&job.job_id) {
        return "Job has not been registered with Nomad yet.".to_string();
    }
    "Status is unavailable.".to_string()
}

/// First non-empty of `status` / `nomad_status`, lowercased.
fn effective_status(job: &RepoJob) -> String {
    [job.status.as_deref(), job.nomad_status.as_deref()]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .unwrap_or("")
        .to_lowercase()
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
