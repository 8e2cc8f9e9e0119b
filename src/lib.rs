//! # gitbrowse — metadata browser for a directory of git repositories
//!
//! Scans a root directory for bare repositories, runs the `git` CLI against
//! them and turns its line-oriented output into structured records: commit
//! history, tree listings, per-file diffs and ref tips. A small file-backed
//! cache keeps per-repository daily/total hit counters.
//!
//! ## Library usage
//!
//! ```no_run
//! use gitbrowse::{Browser, BrowseConfig, LogQuery};
//!
//! let config = BrowseConfig::with_root("/srv/git/");
//! let browser = Browser::open(config);
//! let commits = browser.list_commits("linux", &LogQuery::default())?;
//! # Ok::<(), gitbrowse::BrowseError>(())
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

pub mod browser;
pub mod cli;
pub mod config;
pub mod counters;
pub mod error;
pub mod git;
pub mod registry;

pub use browser::Browser;
pub use config::BrowseConfig;
pub use counters::{CounterCache, CounterState, CounterStats};
pub use error::BrowseError;
pub use git::command::{shell_quote, GitCommand};
pub use git::engine::SubprocessEngine;
pub use git::runner::CancelFlag;
pub use git::{Commit, DiffBlock, GitEngine, LogQuery, RefHead, RefKind, TreeEntry};
pub use registry::{Repository, RepositoryRegistry};

/// Seconds in one UTC day.
pub const SECS_PER_DAY: u64 = 86_400;

// ─── Time helpers ───────────────────────────────────────────────────

/// Current Unix time in seconds. A clock before the epoch reads as 0.
#[must_use]
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(std::time::Duration::ZERO)
        .as_secs()
}

/// Number of whole days since 1970-01-01 for a Unix timestamp.
#[must_use]
pub fn days_since_epoch(unix_secs: u64) -> i64 {
    (unix_secs / SECS_PER_DAY) as i64
}
