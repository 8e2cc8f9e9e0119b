//! Git query layer — calls the `git` CLI and parses its text output.
//!
//! Every query goes through [`GitEngine`]. [`engine::SubprocessEngine`] builds
//! argument vectors with [`command`], executes them with [`runner`] and feeds
//! the captured output to the parsers in [`log`], [`tree`], [`diff`] and
//! [`refs`]. An adapter over a native library can implement the trait directly
//! and skip the text round-trip.

use std::path::Path;

use serde::Serialize;

use crate::BrowseError;

pub mod command;
pub mod diff;
pub mod engine;
pub mod log;
pub mod refs;
pub mod runner;
pub mod tree;

// ─── Record protocol (version 1) ────────────────────────────────────
//
// `rev-list --pretty=format:<LOG_FORMAT>` renders each commit as
//
//     commit <hash>
//     parents <hash> <hash>...
//     tree <hash>
//     author <name>
//     email <email>
//     timestamp <unix seconds>
//     subject <first line of message>
//     endrecord
//     <blank line>
//
// One field per line, `<name> <value>`, in this order. The sentinel closes the
// field block; the blank line closes the record.

/// Version of the log record protocol below. Bump when fields change.
pub const LOG_PROTOCOL_VERSION: u32 = 1;

/// Line closing the field block of a record.
pub const RECORD_SENTINEL: &str = "endrecord";

/// Field names in the order the engine emits them.
pub const LOG_FIELDS: [&str; 6] = ["parents", "tree", "author", "email", "timestamp", "subject"];

/// Pretty-format template producing the record protocol.
pub const LOG_FORMAT: &str =
    "parents %P%ntree %T%nauthor %aN%nemail %aE%ntimestamp %at%nsubject %s%nendrecord%n";

/// Range token meaning "every ref".
pub const ALL_REFS: &str = "--all";

// ─── Types ──────────────────────────────────────────────────────────

/// One commit from the history listing.
///
/// Fields the engine did not report are left empty (`0` for the timestamp).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub hash: String,
    /// First parent first.
    pub parents: Vec<String>,
    pub tree: String,
    pub author: String,
    pub email: String,
    /// Author time, Unix seconds.
    pub timestamp: i64,
    pub subject: String,
}

/// Changes to one file within a commit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DiffBlock {
    /// Header lines (`diff --git`, `index`, `---`, `+++`), newline-joined.
    pub summary: String,
    /// Hunk lines starting at the first `@@`, newline-joined.
    pub file: String,
}

/// One entry of a tree listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub perm: String,
    /// `blob`, `tree` or `commit`.
    #[serde(rename = "type")]
    pub kind: String,
    pub hash: String,
    /// May contain spaces.
    pub file: String,
}

/// A branch or tag and the commit it points at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RefHead {
    pub name: String,
    pub hash: String,
}

/// Which family of refs to list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefKind {
    Branches,
    Tags,
}

impl RefKind {
    /// The `rev-parse --symbolic` selector for this kind.
    pub fn selector(self) -> &'static str {
        match self {
            RefKind::Branches => "--branches",
            RefKind::Tags => "--tags",
        }
    }
}

// ─── History query ──────────────────────────────────────────────────

/// Parameters for a history listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogQuery {
    pub since: String,
    pub until: String,
    /// `1` switches to single-commit mode: `since` is fetched directly.
    pub count: usize,
    /// Extra flags, given without the leading `--`.
    pub params: Vec<String>,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            since: "HEAD".to_string(),
            until: "HEAD".to_string(),
            count: 10,
            params: Vec::new(),
        }
    }
}

impl LogQuery {
    /// Query fetching exactly one commit.
    pub fn single(commit: &str) -> Self {
        Self {
            since: commit.to_string(),
            count: 1,
            ..Self::default()
        }
    }

    /// Revision argument for `rev-list`.
    ///
    /// A count of 1 targets `since` alone. Otherwise the range is
    /// `since..until`, and an empty range or `HEAD..HEAD` means the
    /// whole history ([`ALL_REFS`]).
    pub fn range_token(&self) -> String {
        if self.count == 1 {
            return self.since.clone();
        }
        let range = format!("{}..{}", self.since, self.until);
        if range == ".." || range == "HEAD..HEAD" {
            ALL_REFS.to_string()
        } else {
            range
        }
    }

    /// `--max-count=<count>` followed by every extra param as `--<param>`.
    pub fn flags(&self) -> Vec<String> {
        let mut flags = Vec::with_capacity(self.params.len() + 1);
        flags.push(format!("--max-count={}", self.count));
        flags.extend(self.params.iter().map(|p| format!("--{}", p)));
        flags
    }
}

// ─── Engine capability ──────────────────────────────────────────────

/// Operations the browser needs from a version-control engine.
///
/// `git_dir` is the repository directory the invocation is scoped to
/// (`<project path><suffix>`).
pub trait GitEngine {
    /// Display name of the committer of the oldest commit reachable from
    /// `HEAD`. `None` for empty repositories and for any failure.
    fn owner(&self, git_dir: &Path) -> Option<String>;

    /// Branch or tag names with the commit each resolves to.
    fn list_refs(&self, git_dir: &Path, kind: RefKind) -> Result<Vec<RefHead>, BrowseError>;

    /// History listing.
    fn rev_list(&self, git_dir: &Path, query: &LogQuery) -> Result<Vec<Commit>, BrowseError>;

    /// Message body and per-file diffs of one commit.
    fn show_commit(&self, git_dir: &Path, commit: &str) -> Result<Vec<DiffBlock>, BrowseError>;

    /// Entries of a tree (commit, branch or tree id).
    fn ls_tree(&self, git_dir: &Path, treeish: &str) -> Result<Vec<TreeEntry>, BrowseError>;
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
