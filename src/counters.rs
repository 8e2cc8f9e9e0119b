//! Per-repository hit counters persisted as `<day> <today> <total>\n`.
//!
//! Each update is a read-modify-write under an exclusive lock on the counter
//! file, so concurrent increments of the same repository serialize.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{days_since_epoch, unix_now, BrowseError};

/// Default counter file prefix.
pub const DEFAULT_PREFIX: &str = "counters";

/// Persisted counter state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CounterState {
    /// Days since the epoch of the last update.
    pub day: i64,
    pub today: u64,
    pub total: u64,
}

impl CounterState {
    fn fresh(day: i64) -> Self {
        Self { day, today: 0, total: 0 }
    }

    /// Parse `<day> <today> <total>`. `None` if any field is missing or not a number.
    pub fn parse(content: &str) -> Option<Self> {
        let mut fields = content.split_whitespace();
        let day = fields.next()?.parse().ok()?;
        let today = fields.next()?.parse().ok()?;
        let total = fields.next()?.parse().ok()?;
        Some(Self { day, today, total })
    }

    fn render(&self) -> String {
        format!("{} {} {}\n", self.day, self.today, self.total)
    }

    /// Roll over to `day` and optionally count one hit.
    fn advance(mut self, day: i64, increment: bool) -> Self {
        if self.day != day {
            self.day = day;
            self.today = 0;
        }
        if increment {
            self.today = self.today.saturating_add(1);
            self.total = self.total.saturating_add(1);
        }
        self
    }
}

/// Counts returned to the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CounterStats {
    pub today: u64,
    pub total: u64,
}

/// File-backed counter store rooted at a cache directory.
#[derive(Clone, Debug)]
pub struct CounterCache {
    root: PathBuf,
    prefix: String,
}

impl CounterCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    /// Use `prefix` instead of [`DEFAULT_PREFIX`] for counter file names.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// `<root>/<repo base name>/<prefix>-<base name without .git>`.
    pub fn counter_path(&self, repo: &str) -> Result<PathBuf, BrowseError> {
        let base = base_name(repo)?;
        let stem = base.strip_suffix(".git").unwrap_or(base);
        Ok(self.root.join(base).join(format!("{}-{}", self.prefix, stem)))
    }

    /// Read the counters for `repo` as of today, counting one hit when `increment` is set.
    pub fn stats(&self, repo: &str, increment: bool) -> Result<CounterStats, BrowseError> {
        self.stats_on_day(repo, increment, days_since_epoch(unix_now()))
    }

    /// [`stats`](Self::stats) with an explicit current day.
    pub fn stats_on_day(
        &self,
        repo: &str,
        increment: bool,
        day: i64,
    ) -> Result<CounterStats, BrowseError> {
        let path = self.counter_path(repo)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        FileExt::lock_exclusive(&file).map_err(|source| BrowseError::CounterLock {
            path: path.display().to_string(),
            source,
        })?;

        let result = update_locked(&mut file, &path, day, increment);
        if let Err(e) = FileExt::unlock(&file) {
            debug!(path = %path.display(), error = %e, "counter unlock failed; released on close");
        }
        let state = result?;

        Ok(CounterStats {
            today: state.today,
            total: state.total,
        })
    }
}

/// Read, advance and rewrite the state. The caller holds the lock.
fn update_locked(
    file: &mut File,
    path: &Path,
    day: i64,
    increment: bool,
) -> Result<CounterState, BrowseError> {
    let mut content = String::new();
    let stored = match file.read_to_string(&mut content) {
        Ok(_) => CounterState::parse(&content),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable counter file, starting fresh");
            None
        }
    };
    if stored.is_none() && !content.trim().is_empty() {
        warn!(path = %path.display(), content = %content.trim(), "corrupt counter file, starting fresh");
    }

    let state = stored
        .unwrap_or_else(|| CounterState::fresh(day))
        .advance(day, increment);

    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(state.render().as_bytes())?;
    file.flush()?;
    Ok(state)
}

/// Last path component of a repository identity (`/srv/git/proj/` → `proj`).
fn base_name(repo: &str) -> Result<&str, BrowseError> {
    let base = repo
        .trim_end_matches(['/', std::path::MAIN_SEPARATOR])
        .rsplit(['/', std::path::MAIN_SEPARATOR])
        .next()
        .unwrap_or("");
    if base.is_empty() || base == "." || base == ".." {
        return Err(BrowseError::InvalidArgs(format!(
            "no repository name in '{}'",
            repo
        )));
    }
    Ok(base)
}

#[cfg(test)]
#[path = "counters_tests.rs"]
mod tests;
