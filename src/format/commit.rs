//! Commit hash and commit URL helpers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Display length for truncated commit hashes.
pub const SHORT_HASH_LEN: usize = 7;

/// scp-style remote: `git@host:path`.
static SCP_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^git@([^:]+):(.+)$").expect("regex: scp-style git url"));

/// Truncate a commit hash for display; a repo that has never been polled
/// has no commit and shows "pending".
pub fn format_commit_hash(hash: Option<&str>, length: usize) -> String {
    match hash.filter(|h| !h.is_empty()) {
        Some(h) => h.chars().take(length).collect(),
        None => "pending".to_string(),
    }
}

/// Derive a browsable commit URL from a repo's remote URL.
///
/// Handles https/http remotes directly, and rewrites scp-style
/// (`git@host:path`) and `ssh://` remotes onto their https equivalent.
/// Anything else (including a missing commit) yields `None`; the caller
/// renders plain text instead of a link.
pub fn build_commit_url(repo_url: &str, last_commit: Option<&str>) -> Option<String> {
    let commit = last_commit.filter(|c| !c.is_empty())?;
    let raw = repo_url.trim();
    if raw.is_empty() {
        return None;
    }

    let normalized = strip_git_suffix(raw);

    if normalized.starts_with("http://") || normalized.starts_with("https://") {
        return Some(format!("{normalized}/commit/{commit}"));
    }

    if let Some(caps) = SCP_LIKE.captures(normalized) {
        let host = &caps[1];
        let path = &caps[2];
        return Some(format!("https://{host}/{path}/commit/{commit}"));
    }

    if let Some(rest) = normalized.strip_prefix("ssh://") {
        // ssh://[user@]host[:port]/path
        let rest = rest.split_once('@').map_or(rest, |(_, tail)| tail);
        let (host_port, path) = rest.split_once('/')?;
        let host = host_port.split(':').next().unwrap_or(host_port);
        let path = path.trim_start_matches('/');
        if host.is_empty() || path.is_empty() {
            return None;
        }
        return Some(format!("https://{host}/{path}/commit/{commit}"));
    }

    None
}

fn strip_git_suffix(url: &str) -> &str {
    if url.to_ascii_lowercase().ends_with(".git") {
        &url[..url.len() - 4]
    } else {
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_falls_back_to_pending_when_missing() {
        assert_eq!(format_commit_hash(None, SHORT_HASH_LEN), "pending");
        assert_eq!(format_commit_hash(Some(""), SHORT_HASH_LEN), "pending");
    }

    #[test]
    fn hash_is_trimmed_to_the_given_length() {
        assert_eq!(format_commit_hash(Some("abcdef123456"), 8), "abcdef12");
        assert_eq!(format_commit_hash(Some("abc"), SHORT_HASH_LEN), "abc");
    }

    #[test]
    fn url_is_none_when_commit_is_missing() {
        assert_eq!(build_commit_url("https://github.com/acme/demo", None), None);
    }

    #[test]
    fn url_is_none_when_remote_is_blank() {
        assert_eq!(build_commit_url("  ", Some("abcdef1")), None);
    }

    #[test]
    fn builds_urls_for_https_remotes() {
        assert_eq!(
            build_commit_url("https://github.com/acme/demo", Some("abcdef1")).as_deref(),
            Some("https://github.com/acme/demo/commit/abcdef1")
        );
        assert_eq!(
            build_commit_url("https://github.com/acme/demo.git", Some("abcdef1")).as_deref(),
            Some("https://github.com/acme/demo/commit/abcdef1")
        );
    }

    #[test]
    fn builds_urls_for_scp_style_remotes() {
        assert_eq!(
            build_commit_url("git@github.com:acme/demo.git", Some("abcdef1")).as_deref(),
            Some("https://github.com/acme/demo/commit/abcdef1")
        );
    }

    #[test]
    fn builds_urls_for_ssh_remotes() {
        assert_eq!(
            build_commit_url("ssh://git@example.com/acme/demo.git", Some("abcdef1")).as_deref(),
            Some("https://example.com/acme/demo/commit/abcdef1")
        );
        assert_eq!(
            build_commit_url("ssh://git@example.com:2222/acme/demo", Some("abcdef1")).as_deref(),
            Some("https://example.com/acme/demo/commit/abcdef1")
        );
    }

    #[test]
    fn unrecognized_remotes_yield_none() {
        assert_eq!(build_commit_url("ftp://example.com/demo", Some("abcdef1")), None);
    }
}
