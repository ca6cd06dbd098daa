//! Plain-table rendering for CLI output.

use chrono::Utc;

use crate::api::{CompassStatus, Credential};
use crate::format::{
    build_commit_url, format_commit_hash, format_relative_time, job_status_label,
    job_status_severity, job_status_tooltip, SHORT_HASH_LEN,
};
use crate::store::StoreState;

pub fn status(status: Option<&CompassStatus>) {
    match status {
        Some(s) if s.nomad_connected => println!("Nomad: connected"),
        Some(s) => match s.nomad_message.as_deref() {
            Some(message) => println!("Nomad: disconnected — {message}"),
            None => println!("Nomad: disconnected"),
        },
        None => println!("Nomad: status unknown"),
    }
}

pub fn summary(state: &StoreState) {
    println!(
        "{} credential{}, {} repo{}",
        state.credentials.len(),
        plural(state.credentials.len()),
        state.repos.len(),
        plural(state.repos.len()),
    );
    status(state.status.as_ref());
}

pub fn repo_table(state: &StoreState) {
    if state.repos.is_empty() {
        println!("No repositories tracked.");
        return;
    }

    let now = Utc::now();
    println!(
        "{:<6} {:<20} {:<12} {:<26} {:<20} {}",
        "ID", "NAME", "BRANCH", "COMMIT", "LAST POLL", "CREDENTIAL"
    );
    println!("{}", "─".repeat(100));

    for repo in &state.repos {
        let hash = format_commit_hash(repo.last_commit.as_deref(), SHORT_HASH_LEN);
        let commit = match repo.last_commit_author.as_deref() {
            Some(author) => format!("{hash} ({author})"),
            None => hash,
        };
        println!(
            "{:<6} {:<20} {:<12} {:<26} {:<20} {}",
            repo.id,
            repo.name,
            repo.branch,
            commit,
            format_relative_time(repo.last_polled_at.as_deref(), now),
            credential_label(repo.credential_id, &state.credentials),
        );

        if let Some(title) = repo.last_commit_title.as_deref() {
            println!("       {title}");
        }
        if let Some(url) = build_commit_url(&repo.repo_url, repo.last_commit.as_deref()) {
            println!("       {url}");
        }

        if repo.jobs.is_empty() {
            println!("       (no jobs derived yet)");
            continue;
        }
        for job in &repo.jobs {
            println!(
                "       {} {:<28} {:<12} {}",
                job_status_severity(job).glyph(),
                job.path,
                job_status_label(job),
                job_status_tooltip(job),
            );
        }
    }
}

pub fn credential_table(state: &StoreState) {
    if state.credentials.is_empty() {
        println!("No credentials stored.");
        return;
    }

    let now = Utc::now();
    println!("{:<6} {:<24} {:<10} {}", "ID", "NAME", "TYPE", "CREATED");
    println!("{}", "─".repeat(60));
    for credential in &state.credentials {
        println!(
            "{:<6} {:<24} {:<10} {}",
            credential.id,
            credential.name,
            credential.kind,
            format_relative_time(credential.created_at.as_deref(), now),
        );
    }
}

/// Resolve a repo's credential reference to a display name. The reference
/// is weak: a dangling id renders as "none", same as no reference at all.
fn credential_label(credential_id: Option<i64>, credentials: &[Credential]) -> String {
    credential_id
        .and_then(|id| credentials.iter().find(|c| c.id == id))
        .map(|c| c.name.clone())
        .unwrap_or_else(|| "none".to_string())
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_label_resolves_by_id() {
        let credentials = vec![Credential {
            id: 7,
            name: "deploy-key".into(),
            kind: "ssh_key".into(),
            ..Default::default()
        }];
        assert_eq!(credential_label(Some(7), &credentials), "deploy-key");
    }

    #[test]
    fn dangling_credential_reference_renders_as_none() {
        assert_eq!(credential_label(Some(99), &[]), "none");
        assert_eq!(credential_label(None, &[]), "none");
    }
}
