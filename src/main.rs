use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};

use compass::api::{CredentialPayload, Http, HttpApi, RepoPayload};
use compass::cli;
use compass::config::{Config, Overrides};
use compass::store::CompassStore;

#[derive(Parser)]
#[command(
    name = "compass",
    about = "Ops CLI for the Compass deployment dashboard",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Compass server base URL
    #[arg(long, env = "COMPASS_SERVER", global = true)]
    server: Option<String>,

    /// Path to config.toml (default: $XDG_CONFIG_HOME/compass/config.toml)
    #[arg(long, env = "COMPASS_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error)
    #[arg(long, env = "COMPASS_LOG", global = true)]
    log: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, env = "COMPASS_TIMEOUT", global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Show orchestrator connectivity.
    ///
    /// Probes the API health endpoint first, then fetches the Nomad
    /// connection status.
    ///
    /// Examples:
    ///   compass status
    Status,
    /// Manage tracked repositories.
    Repo {
        #[command(subcommand)]
        action: RepoAction,
    },
    /// Manage source-control credentials.
    Cred {
        #[command(subcommand)]
        action: CredAction,
    },
    /// Re-fetch everything once and print a summary.
    ///
    /// Partial failures are tolerated: whatever fetched is kept, and the
    /// first failure becomes the exit status.
    ///
    /// Examples:
    ///   compass refresh
    Refresh,
}

#[derive(Subcommand)]
enum RepoAction {
    /// List repositories and their derived jobs.
    List,
    /// Track a new repository.
    ///
    /// Blocks through the job-derivation window: the server derives the
    /// repo's jobs asynchronously, and this command waits (bounded) until
    /// they appear before reporting.
    ///
    /// Examples:
    ///   compass repo add --name demo --url https://git.example/demo
    ///   compass repo add --name demo --url git@git.example:acme/demo.git --credential-id 3
    Add {
        #[arg(long)]
        name: String,
        /// Clone URL of the repository
        #[arg(long = "url")]
        repo_url: String,
        #[arg(long, default_value = "main")]
        branch: String,
        /// Directory inside the repo that holds the job specs
        #[arg(long = "job-path", default_value = ".nomad")]
        job_path: String,
        /// Credential to clone with (omit for public repos)
        #[arg(long = "credential-id")]
        credential_id: Option<i64>,
    },
    /// Stop tracking a repository.
    Rm {
        id: i64,
        /// Also stop the repo's jobs on the orchestrator
        #[arg(long)]
        unschedule: bool,
    },
    /// Trigger an immediate re-sync against the source and the orchestrator.
    ///
    /// Examples:
    ///   compass repo reconcile 42
    Reconcile { id: i64 },
}

#[derive(Subcommand)]
enum CredAction {
    /// List stored credentials.
    List,
    /// Store a new credential.
    ///
    /// Examples:
    ///   compass cred add --name ci-token --kind token --token $TOKEN
    ///   compass cred add --name deploy-key --kind ssh_key --private-key-file ~/.ssh/deploy
    Add {
        #[arg(long)]
        name: String,
        /// Auth mechanism, e.g. "token" or "ssh_key"
        #[arg(long)]
        kind: String,
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        username: Option<String>,
        /// Read the private key from this file
        #[arg(long = "private-key-file")]
        private_key_file: Option<PathBuf>,
        #[arg(long)]
        passphrase: Option<String>,
    },
    /// Delete a stored credential.
    Rm {
        id: i64,
        /// Also delete repos that use this credential
        #[arg(long = "delete-repos")]
        delete_repos: bool,
        /// Unschedule the deleted repos' jobs from the orchestrator
        #[arg(long)]
        unschedule: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::resolve(
        Overrides {
            server_url: args.server.clone(),
            timeout_secs: args.timeout,
            log: args.log.clone(),
        },
        args.config.as_deref(),
    );
    setup_logging(&config.log);

    let http = Http::new(&config.server_url, config.timeout())
        .context("failed to build HTTP client")?;
    let api = Arc::new(HttpApi::new(http));
    let store = CompassStore::with_poll(api.clone(), config.poll());

    match args.command {
        Command::Status => cli::status(&store, api.as_ref()).await,
        Command::Refresh => cli::refresh(&store).await,
        Command::Repo { action } => match action {
            RepoAction::List => cli::repo_list(&store).await,
            RepoAction::Add {
                name,
                repo_url,
                branch,
                job_path,
                credential_id,
            } => {
                cli::repo_add(
                    &store,
                    RepoPayload {
                        name,
                        repo_url,
                        branch,
                        job_path,
                        credential_id,
                    },
                )
                .await
            }
            RepoAction::Rm { id, unschedule } => cli::repo_rm(&store, id, unschedule).await,
            RepoAction::Reconcile { id } => cli::repo_reconcile(&store, id).await,
        },
        Command::Cred { action } => match action {
            CredAction::List => cli::cred_list(&store).await,
            CredAction::Add {
                name,
                kind,
                token,
                username,
                private_key_file,
                passphrase,
            } => {
                let private_key = match private_key_file {
                    Some(path) => Some(std::fs::read_to_string(&path).with_context(|| {
                        format!("could not read private key from {}", path.display())
                    })?),
                    None => None,
                };
                cli::cred_add(
                    &store,
                    CredentialPayload {
                        name,
                        kind,
                        token,
                        username,
                        private_key,
                        passphrase,
                    },
                )
                .await
            }
            CredAction::Rm {
                id,
                delete_repos,
                unschedule,
            } => cli::cred_rm(&store, id, delete_repos, unschedule).await,
        },
    }
}

/// Logs go to stderr so tables on stdout stay pipeable.
fn setup_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
