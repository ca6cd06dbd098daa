//! Layered configuration.
//!
//! Priority: CLI flag / env var  >  TOML file  >  built-in default.
//! clap absorbs the `COMPASS_*` env vars into the CLI layer, so by the time
//! values reach [`Config::resolve`] the first layer is already collapsed
//! into [`Overrides`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::store::poll::{DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_DELAY_MS};
use crate::store::PollConfig;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG: &str = "info";

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Compass server base URL.
    pub server_url: String,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
    /// Log level filter string, e.g. "debug", "info,compass=trace".
    pub log: String,
    /// Attempt budget for the post-create job-derivation wait.
    pub poll_attempts: u32,
    /// Delay between attempts, in milliseconds.
    pub poll_delay_ms: u64,
}

/// `config.toml`; all fields are optional overrides.
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    server_url: Option<String>,
    timeout_secs: Option<u64>,
    log: Option<String>,
    poll_attempts: Option<u32>,
    poll_delay_ms: Option<u64>,
}

/// CLI-layer overrides (flags already merged with env vars by clap).
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub server_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub log: Option<String>,
}

impl Config {
    /// Resolve the effective configuration. A missing file is fine; an
    /// unreadable or malformed one logs a warning and falls through to the
    /// remaining layers.
    pub fn resolve(overrides: Overrides, config_path: Option<&Path>) -> Self {
        let file = config_path
            .map(PathBuf::from)
            .or_else(default_config_path)
            .map(|path| load_toml(&path))
            .unwrap_or_default();

        Self {
            server_url: overrides
                .server_url
                .or(file.server_url)
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            timeout_secs: overrides
                .timeout_secs
                .or(file.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            log: overrides
                .log
                .or(file.log)
                .unwrap_or_else(|| DEFAULT_LOG.to_string()),
            poll_attempts: file.poll_attempts.unwrap_or(DEFAULT_POLL_ATTEMPTS),
            poll_delay_ms: file.poll_delay_ms.unwrap_or(DEFAULT_POLL_DELAY_MS),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll(&self) -> PollConfig {
        PollConfig {
            attempts: self.poll_attempts,
            delay: Duration::from_millis(self.poll_delay_ms),
        }
    }
}

fn load_toml(path: &Path) -> TomlConfig {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        // Absent config file: defaults apply.
        Err(_) => return TomlConfig::default(),
    };

    match toml::from_str(&raw) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring malformed config file");
            TomlConfig::default()
        }
    }
}

/// `$XDG_CONFIG_HOME/compass/config.toml`, else `~/.config/compass/config.toml`.
fn default_config_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return Some(PathBuf::from(xdg).join("compass").join("config.toml"));
        }
    }
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config").join("compass").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_apply_without_file_or_overrides() {
        // A path that does not exist behaves like no file at all.
        let config = Config::resolve(Overrides::default(), Some(Path::new("/nonexistent/config.toml")));
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.log, "info");
        assert_eq!(config.poll().attempts, 6);
        assert_eq!(config.poll().delay, Duration::from_millis(2000));
    }

    #[test]
    fn file_values_override_defaults() {
        let file = write_config(
            r#"
server_url = "https://compass.internal:8080"
timeout_secs = 10
poll_attempts = 3
poll_delay_ms = 500
"#,
        );

        let config = Config::resolve(Overrides::default(), Some(file.path()));
        assert_eq!(config.server_url, "https://compass.internal:8080");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.poll_attempts, 3);
        assert_eq!(config.poll_delay_ms, 500);
    }

    #[test]
    fn cli_layer_beats_file_values() {
        let file = write_config(r#"server_url = "https://from-file""#);

        let config = Config::resolve(
            Overrides {
                server_url: Some("https://from-flag".to_string()),
                timeout_secs: Some(5),
                log: Some("debug".to_string()),
            },
            Some(file.path()),
        );
        assert_eq!(config.server_url, "https://from-flag");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.log, "debug");
    }

    #[test]
    fn malformed_file_falls_through_to_defaults() {
        let file = write_config("server_url = [not toml");

        let config = Config::resolve(Overrides::default(), Some(file.path()));
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
    }
}
