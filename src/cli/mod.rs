//! CLI command implementations.
//!
//! Each command drives the store the way a dashboard view would: invoke an
//! action, read a fresh snapshot, render. All remote interaction goes
//! through the store; rendering goes through the pure `format` helpers.

pub mod render;

use anyhow::{bail, Context as _, Result};

use crate::api::{
    CompassApi, CredentialPayload, DeleteCredentialOptions, DeleteRepoOptions, RepoPayload,
};
use crate::store::CompassStore;

/// `compass status`: orchestrator connectivity plus an API liveness probe.
pub async fn status(store: &CompassStore, api: &dyn CompassApi) -> Result<()> {
    api.ping().await.context("compass server is unreachable")?;
    store
        .load_status()
        .await
        .context("could not load orchestrator status")?;
    render::status(store.snapshot().await.status.as_ref());
    Ok(())
}

/// `compass refresh`: one bulk refresh, then a summary. The bulk path only
/// records failures, so the recorded error is surfaced here as the exit
/// status.
pub async fn refresh(store: &CompassStore) -> Result<()> {
    store.refresh_all().await;
    let snapshot = store.snapshot().await;
    render::summary(&snapshot);
    if let Some(error) = snapshot.error {
        bail!(error);
    }
    Ok(())
}

/// `compass repo list`
pub async fn repo_list(store: &CompassStore) -> Result<()> {
    store.refresh_all().await;
    let snapshot = store.snapshot().await;
    if let Some(error) = snapshot.error {
        bail!(error);
    }
    render::repo_table(&snapshot);
    Ok(())
}

/// `compass repo add`: blocks through the job-derivation window, then
/// reports whether jobs showed up inside it.
pub async fn repo_add(store: &CompassStore, payload: RepoPayload) -> Result<()> {
    let name = payload.name.clone();
    store.create_repo(payload).await?;

    let snapshot = store.snapshot().await;
    match snapshot.repos.iter().find(|repo| repo.name == name) {
        Some(repo) if !repo.jobs.is_empty() => {
            println!(
                "Created repo {} with {} job{}.",
                repo.id,
                repo.jobs.len(),
                plural(repo.jobs.len())
            );
        }
        Some(repo) => {
            println!(
                "Created repo {}. Job derivation is still pending; check `compass repo list` shortly.",
                repo.id
            );
        }
        None => println!("Created repo '{name}'."),
    }
    Ok(())
}

pub async fn repo_rm(store: &CompassStore, id: i64, unschedule: bool) -> Result<()> {
    store.delete_repo(id, DeleteRepoOptions { unschedule }).await?;
    println!("Deleted repo {id}.");
    Ok(())
}

pub async fn repo_reconcile(store: &CompassStore, id: i64) -> Result<()> {
    store.trigger_reconcile(id).await?;
    println!("Reconcile triggered for repo {id}.");
    Ok(())
}

/// `compass cred list`
pub async fn cred_list(store: &CompassStore) -> Result<()> {
    store
        .load_credentials()
        .await
        .context("could not load credentials")?;
    render::credential_table(&store.snapshot().await);
    Ok(())
}

pub async fn cred_add(store: &CompassStore, payload: CredentialPayload) -> Result<()> {
    let name = payload.name.clone();
    store.create_credential(payload).await?;

    let snapshot = store.snapshot().await;
    // Names are not unique; the newest match is the one we just created.
    match snapshot.credentials.iter().rev().find(|c| c.name == name) {
        Some(credential) => println!("Created credential {} ({}).", credential.id, credential.name),
        None => println!("Created credential '{name}'."),
    }
    Ok(())
}

pub async fn cred_rm(
    store: &CompassStore,
    id: i64,
    delete_repos: bool,
    unschedule: bool,
) -> Result<()> {
    store
        .delete_credential(
            id,
            DeleteCredentialOptions {
                delete_repos,
                unschedule,
            },
        )
        .await?;
    println!("Deleted credential {id}.");
    Ok(())
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
