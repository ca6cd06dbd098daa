//! Pure display-formatting helpers.
//!
//! No store coupling, no I/O: everything here maps wire values to strings
//! the CLI can print. Timestamps stay RFC 3339 strings on the wire; parsing
//! happens here and only here.

pub mod commit;
pub mod status;
pub mod time;

pub use commit::{build_commit_url, format_commit_hash, SHORT_HASH_LEN};
pub use status::{job_status_label, job_status_severity, job_status_tooltip, JobSeverity};
pub use time::{format_relative_time, format_timestamp, AWAITING_FIRST_POLL};
