//! Per-project operations for the routing/presentation layer.
//!
//! Project names, branches and paths arrive from routing already
//! charset-constrained; they are still validated and quoted before they
//! reach the engine.

use tracing::debug;

use crate::counters::{CounterCache, CounterStats};
use crate::git::engine::SubprocessEngine;
use crate::git::{Commit, DiffBlock, GitEngine, LogQuery, RefHead, RefKind, TreeEntry};
use crate::registry::{Repository, RepositoryRegistry};
use crate::{BrowseConfig, BrowseError};

/// Registry, engine and counters for one repository root.
pub struct Browser<E: GitEngine = SubprocessEngine> {
    config: BrowseConfig,
    registry: RepositoryRegistry,
    engine: E,
    counters: CounterCache,
}

impl Browser<SubprocessEngine> {
    /// Scan `config.repo_root` using the `git` command line.
    pub fn open(config: BrowseConfig) -> Self {
        let engine = SubprocessEngine::from_config(&config);
        Self::with_engine(config, engine)
    }

    /// The exact command a history listing would run, without running it.
    pub fn log_command(&self, project: &str, query: &LogQuery) -> Result<String, BrowseError> {
        let repo = self.registry.get(project)?;
        let cmd = self.engine.builder().rev_list(&repo.git_dir, query)?;
        Ok(cmd.to_shell_string())
    }
}

impl<E: GitEngine> Browser<E> {
    /// Scan `config.repo_root` with a custom engine.
    pub fn with_engine(config: BrowseConfig, engine: E) -> Self {
        let registry = RepositoryRegistry::load(&config.repo_root, &config.repo_suffix, &engine);
        let counters = CounterCache::new(&config.cache_dir);
        Self {
            config,
            registry,
            engine,
            counters,
        }
    }

    pub fn config(&self) -> &BrowseConfig {
        &self.config
    }

    pub fn registry(&self) -> &RepositoryRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Registered repositories, ordered by name.
    pub fn projects(&self) -> impl Iterator<Item = &Repository> {
        self.registry.iter()
    }

    pub fn project(&self, name: &str) -> Result<&Repository, BrowseError> {
        self.registry.get(name)
    }

    /// History listing for `project`.
    pub fn list_commits(&self, project: &str, query: &LogQuery) -> Result<Vec<Commit>, BrowseError> {
        let repo = self.registry.get(project)?;
        debug!(project = %project, range = %query.range_token(), count = query.count, "listing commits");
        self.engine.rev_list(&repo.git_dir, query)
    }

    /// The ten most recent commits across all refs.
    pub fn shortlog(&self, project: &str) -> Result<Vec<Commit>, BrowseError> {
        self.list_commits(project, &LogQuery::default())
    }

    /// One commit, or `None` when the engine returned no record.
    pub fn commit(&self, project: &str, hash: &str) -> Result<Option<Commit>, BrowseError> {
        let commits = self.list_commits(project, &LogQuery::single(hash))?;
        Ok(commits.into_iter().next())
    }

    pub fn tree(&self, project: &str, treeish: &str) -> Result<Vec<TreeEntry>, BrowseError> {
        let repo = self.registry.get(project)?;
        self.engine.ls_tree(&repo.git_dir, treeish)
    }

    /// Per-file change blocks of one commit.
    pub fn diff(&self, project: &str, commit: &str) -> Result<Vec<DiffBlock>, BrowseError> {
        let repo = self.registry.get(project)?;
        self.engine.show_commit(&repo.git_dir, commit)
    }

    pub fn branches(&self, project: &str) -> Result<Vec<RefHead>, BrowseError> {
        self.refs(project, RefKind::Branches)
    }

    pub fn tags(&self, project: &str) -> Result<Vec<RefHead>, BrowseError> {
        self.refs(project, RefKind::Tags)
    }

    fn refs(&self, project: &str, kind: RefKind) -> Result<Vec<RefHead>, BrowseError> {
        let repo = self.registry.get(project)?;
        self.engine.list_refs(&repo.git_dir, kind)
    }

    /// Hit counters for `project`; `increment` records a page view.
    pub fn stats(&self, project: &str, increment: bool) -> Result<CounterStats, BrowseError> {
        let repo = self.registry.get(project)?;
        self.counters.stats(&repo.path, increment)
    }
}

#[cfg(test)]
#[path = "browser_tests.rs"]
mod tests;
