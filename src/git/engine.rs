//! [`GitEngine`] over the `git` command line.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

use super::command::{CommandBuilder, GitCommand};
use super::runner::{self, CancelFlag};
use super::{diff, log, refs, tree};
use super::{Commit, DiffBlock, GitEngine, LogQuery, RefHead, RefKind, TreeEntry};
use crate::{BrowseConfig, BrowseError};

/// Runs each query as a `git` subprocess bound to the repository via `GIT_DIR`.
#[derive(Clone, Debug)]
pub struct SubprocessEngine {
    builder: CommandBuilder,
    timeout: Option<Duration>,
    cancel: CancelFlag,
}

impl SubprocessEngine {
    pub fn new(git_binary: &str, timeout: Option<Duration>) -> Self {
        Self {
            builder: CommandBuilder::new(git_binary),
            timeout,
            cancel: CancelFlag::new(),
        }
    }

    pub fn from_config(config: &BrowseConfig) -> Self {
        Self::new(&config.git_binary, config.timeout())
    }

    /// Share `cancel` with the caller; setting it kills the running query.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn builder(&self) -> &CommandBuilder {
        &self.builder
    }

    fn exec(&self, cmd: &GitCommand) -> Result<String, BrowseError> {
        runner::run(cmd, self.timeout, &self.cancel)
    }
}

impl GitEngine for SubprocessEngine {
    fn owner(&self, git_dir: &Path) -> Option<String> {
        // Failures and empty repositories look the same to the registry.
        match self.exec(&self.builder.owner(git_dir)) {
            Ok(output) => refs::parse_owner(&output),
            Err(e) => {
                debug!(git_dir = %git_dir.display(), error = %e, "owner lookup failed");
                None
            }
        }
    }

    fn list_refs(&self, git_dir: &Path, kind: RefKind) -> Result<Vec<RefHead>, BrowseError> {
        let listing = refs::parse_ref_names(&self.exec(&self.builder.ref_names(git_dir, kind))?);
        if listing.skipped > 0 {
            warn!(git_dir = %git_dir.display(), skipped = listing.skipped, "ref listing had non-ref lines");
        }
        let names = listing.names;
        let mut heads = Vec::with_capacity(names.len());
        for name in names {
            let output = self.exec(&self.builder.ref_tip(git_dir, &name)?)?;
            match refs::parse_tip(&output) {
                Some(hash) => heads.push(RefHead { name, hash }),
                None => warn!(git_dir = %git_dir.display(), name = %name, "ref has no tip commit"),
            }
        }
        Ok(heads)
    }

    fn rev_list(&self, git_dir: &Path, query: &LogQuery) -> Result<Vec<Commit>, BrowseError> {
        let output = self.exec(&self.builder.rev_list(git_dir, query)?)?;
        Ok(log::parse_log(&output).commits)
    }

    fn show_commit(&self, git_dir: &Path, commit: &str) -> Result<Vec<DiffBlock>, BrowseError> {
        let output = self.exec(&self.builder.show(git_dir, commit)?)?;
        Ok(diff::parse_diff(&output))
    }

    fn ls_tree(&self, git_dir: &Path, treeish: &str) -> Result<Vec<TreeEntry>, BrowseError> {
        let output = self.exec(&self.builder.ls_tree(git_dir, treeish)?)?;
        Ok(tree::parse_tree(&output).entries)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    /// Stand-in for `git` answering each subcommand with canned protocol output.
    const FAKE_GIT: &str = r#"#!/bin/sh
case "$1" in
  rev-list)
    case "$2" in
      --header) printf 'abc\ncommitter Jane Doe <jane@example.com> 1 +0000\n' ;;
      --max-count=1)
        if [ "$3" = "gone" ]; then echo "fatal: bad revision" >&2; exit 128; fi
        printf '0123456789abcdef0123456789abcdef01234567\n' ;;
      *) printf 'commit 1111\nparents 2222 3333\ntree 4444\nauthor A\nemail a@x\ntimestamp 7\nsubject %s\nendrecord\n\n' "$GIT_DIR" ;;
    esac ;;
  rev-parse) printf 'master\ndev\n' ;;
  show) printf 'body\ndiff --git a/x b/x\n@@ -1 +1 @@\n-a\n+b\n' ;;
  ls-tree)
    if [ "$2" = "missing" ]; then echo "fatal: Not a valid object name missing" >&2; exit 128; fi
    printf '100644 blob aaaa\tREAD ME\n' ;;
  *) echo "unknown $1" >&2; exit 1 ;;
esac
"#;

    fn fake_engine() -> (tempfile::TempDir, SubprocessEngine, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let script = tmp.path().join("git");
        fs::write(&script, FAKE_GIT).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        let engine = SubprocessEngine::new(script.to_str().unwrap(), Some(Duration::from_secs(10)));
        let git_dir = tmp.path().join("proj").join(".git");
        (tmp, engine, git_dir)
    }

    #[test]
    fn test_owner_from_committer_line() {
        let (_tmp, engine, git_dir) = fake_engine();
        assert_eq!(engine.owner(&git_dir).as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_owner_none_when_engine_missing() {
        let engine = SubprocessEngine::new("/definitely/not/a/git", None);
        assert_eq!(engine.owner(Path::new("/tmp/x.git")), None);
    }

    #[test]
    fn test_rev_list_parses_records_and_binds_git_dir() {
        let (_tmp, engine, git_dir) = fake_engine();
        let commits = engine.rev_list(&git_dir, &LogQuery::default()).unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].hash, "1111");
        assert_eq!(commits[0].parents, vec!["2222", "3333"]);
        assert_eq!(commits[0].subject, git_dir.to_str().unwrap());
    }

    #[test]
    fn test_list_refs_resolves_tips() {
        let (_tmp, engine, git_dir) = fake_engine();
        let refs = engine.list_refs(&git_dir, RefKind::Branches).unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].name, "master");
        assert_eq!(refs[1].hash, "0123456789abcdef0123456789abcdef01234567");
    }

    #[test]
    fn test_show_and_ls_tree() {
        let (_tmp, engine, git_dir) = fake_engine();
        let blocks = engine.show_commit(&git_dir, "1111").unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].summary, "body\ndiff --git a/x b/x");

        let entries = engine.ls_tree(&git_dir, "master").unwrap();
        assert_eq!(entries[0].file, "READ ME");
    }

    #[test]
    fn test_ls_tree_failure_carries_output() {
        let (_tmp, engine, git_dir) = fake_engine();
        match engine.ls_tree(&git_dir, "missing").unwrap_err() {
            BrowseError::EngineExecution { output, .. } => {
                assert!(output.contains("Not a valid object name"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_revision_never_reaches_engine() {
        let (_tmp, engine, git_dir) = fake_engine();
        assert!(matches!(
            engine.show_commit(&git_dir, "--output=/tmp/pwned"),
            Err(BrowseError::InvalidArgs(_))
        ));
    }

    #[test]
    fn test_empty_bare_repository_has_no_owner() {
        // Real git, when available: a fresh bare repository has no commits.
        let tmp = tempfile::tempdir().unwrap();
        let git_dir = tmp.path().join("empty.git");
        let init = std::process::Command::new("git")
            .args(["init", "--bare", "--quiet"])
            .arg(&git_dir)
            .status();
        if !matches!(init, Ok(status) if status.success()) {
            return;
        }
        let engine = SubprocessEngine::new("git", Some(Duration::from_secs(10)));
        assert_eq!(engine.owner(&git_dir), None);
    }
}
