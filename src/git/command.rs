//! Engine invocation contract: argument vectors scoped to one git dir.
//!
//! Commands are executed as argument vectors (no shell involved), and are
//! rendered as shell strings only for logging and dry runs. In that rendering
//! every token is single-quoted, so the string is safe to paste into `sh`.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use super::{LogQuery, RefKind, LOG_FORMAT};
use crate::BrowseError;

/// Environment variable that pins git to one repository directory.
pub const GIT_DIR_ENV: &str = "GIT_DIR";

/// Characters that never need quoting in a shell word.
static SHELL_SAFE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_./=:,%+@-]+$").expect("valid regex"));

/// A fully-built engine invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GitCommand {
    pub program: String,
    /// Value bound to [`GIT_DIR_ENV`].
    pub git_dir: PathBuf,
    pub args: Vec<String>,
}

impl GitCommand {
    pub fn new(program: &str, git_dir: &Path) -> Self {
        Self {
            program: program.to_string(),
            git_dir: git_dir.to_path_buf(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Shell rendering: `GIT_DIR='<dir>' <program> '<arg>'...`.
    pub fn to_shell_string(&self) -> String {
        let mut out = format!(
            "{}={} {}",
            GIT_DIR_ENV,
            shell_quote(&self.git_dir.to_string_lossy()),
            shell_quote(&self.program)
        );
        for arg in &self.args {
            out.push(' ');
            out.push_str(&shell_quote(arg));
        }
        out
    }
}

/// Quote `s` as a single shell word.
///
/// Plain tokens pass through; anything else is wrapped in single quotes with
/// embedded quotes written as `'\''`.
pub fn shell_quote(s: &str) -> String {
    if SHELL_SAFE.is_match(s) {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Reject revision tokens git would read as options.
pub fn validate_rev(rev: &str) -> Result<(), BrowseError> {
    if rev.is_empty() {
        return Err(BrowseError::InvalidArgs("empty revision".to_string()));
    }
    if rev.starts_with('-') {
        return Err(BrowseError::InvalidArgs(format!(
            "revision '{}' must not start with '-'",
            rev
        )));
    }
    if rev.chars().any(|c| c.is_control()) {
        return Err(BrowseError::InvalidArgs(format!(
            "revision {:?} contains control characters",
            rev
        )));
    }
    Ok(())
}

// ─── Builders ───────────────────────────────────────────────────────

/// Builds every invocation for one engine binary.
#[derive(Clone, Debug)]
pub struct CommandBuilder {
    program: String,
}

impl CommandBuilder {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    fn base(&self, git_dir: &Path) -> GitCommand {
        GitCommand::new(&self.program, git_dir)
    }

    /// Header of the root commit reachable from `HEAD`; the `committer` line names the owner.
    pub fn owner(&self, git_dir: &Path) -> GitCommand {
        self.base(git_dir)
            .args(["rev-list", "--header", "--max-parents=0", "--max-count=1", "HEAD"])
    }

    /// Symbolic names of all branches or tags.
    pub fn ref_names(&self, git_dir: &Path, kind: RefKind) -> GitCommand {
        self.base(git_dir)
            .args(["rev-parse", "--symbolic", kind.selector()])
    }

    /// Tip commit of one ref.
    pub fn ref_tip(&self, git_dir: &Path, name: &str) -> Result<GitCommand, BrowseError> {
        validate_rev(name)?;
        Ok(self
            .base(git_dir)
            .args(["rev-list", "--max-count=1"])
            .arg(name)
            .arg("--"))
    }

    /// History listing in the record protocol.
    pub fn rev_list(&self, git_dir: &Path, query: &LogQuery) -> Result<GitCommand, BrowseError> {
        let range = query.range_token();
        if range != super::ALL_REFS {
            validate_rev(&range)?;
        }
        for param in &query.params {
            if param.is_empty() || param.chars().any(|c| c.is_control()) {
                return Err(BrowseError::InvalidArgs(format!("invalid log parameter {:?}", param)));
            }
        }
        Ok(self
            .base(git_dir)
            .arg("rev-list")
            .arg(range)
            .args(query.flags())
            .arg(format!("--pretty=format:{}", LOG_FORMAT)))
    }

    /// Message body plus full diff of one commit.
    pub fn show(&self, git_dir: &Path, commit: &str) -> Result<GitCommand, BrowseError> {
        validate_rev(commit)?;
        Ok(self
            .base(git_dir)
            .args(["show", "--format=%b"])
            .arg(commit)
            .arg("--"))
    }

    /// One line per tree entry.
    pub fn ls_tree(&self, git_dir: &Path, treeish: &str) -> Result<GitCommand, BrowseError> {
        validate_rev(treeish)?;
        Ok(self.base(git_dir).arg("ls-tree").arg(treeish))
    }
}
