//! Repository discovery: which project directories under the root are browsable.
//!
//! A project is admitted when its name fits the routing charset,
//! `<root>/<name>/<suffix>/HEAD` exists and the engine reports an owner for
//! it. The registry is built once and is read-only afterwards; share it by
//! reference.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::git::GitEngine;
use crate::BrowseError;

/// Project names accepted from callers and from the root scan (the routing charset).
static PROJECT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w-]+$").expect("valid regex"));

/// A browsable repository.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Repository {
    /// Directory name under the root. Unique within a registry.
    pub name: String,
    /// Absolute project directory, with a trailing separator.
    pub path: String,
    pub owner: Option<String>,
    /// `<path><suffix>`, the directory every engine invocation is bound to.
    #[serde(skip)]
    pub git_dir: PathBuf,
}

/// Immutable name → repository mapping.
#[derive(Clone, Debug, Default)]
pub struct RepositoryRegistry {
    repos: BTreeMap<String, Repository>,
    paths: Vec<String>,
}

impl RepositoryRegistry {
    /// Scan `root` for projects. A missing or unreadable root yields an empty registry.
    pub fn load(root: &Path, suffix: &str, engine: &impl GitEngine) -> Self {
        let root = match fs::canonicalize(root) {
            Ok(p) if p.is_dir() => p,
            _ => {
                warn!(root = %root.display(), "repository root is not a directory");
                return Self::default();
            }
        };
        let entries = match fs::read_dir(&root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "cannot read repository root");
                return Self::default();
            }
        };

        let mut repos = BTreeMap::new();
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str().map(str::to_string) else {
                debug!(entry = ?file_name, "skipping: name is not UTF-8");
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            if !PROJECT_NAME.is_match(&name) {
                debug!(project = %name, "skipping: name outside the project charset");
                continue;
            }
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }

            let git_dir = git_dir_for(&dir, suffix);
            if !git_dir.join("HEAD").exists() {
                debug!(project = %name, "skipping: no HEAD");
                continue;
            }
            let owner = match engine.owner(&git_dir) {
                Some(owner) if !owner.is_empty() => owner,
                _ => {
                    debug!(project = %name, "skipping: no owner (empty repository or engine failure)");
                    continue;
                }
            };

            let path = format!("{}{}", dir.display(), MAIN_SEPARATOR);
            repos.insert(
                name.clone(),
                Repository {
                    name,
                    path,
                    owner: Some(owner),
                    git_dir,
                },
            );
        }

        let mut paths: Vec<String> = repos.values().map(|r| r.path.clone()).collect();
        paths.sort();

        info!(root = %root.display(), repositories = repos.len(), "repository registry loaded");
        Self { repos, paths }
    }

    /// Look up a project, failing with [`BrowseError::RepositoryNotFound`].
    pub fn get(&self, name: &str) -> Result<&Repository, BrowseError> {
        if !PROJECT_NAME.is_match(name) {
            return Err(BrowseError::RepositoryNotFound {
                name: name.to_string(),
            });
        }
        self.repos
            .get(name)
            .ok_or_else(|| BrowseError::RepositoryNotFound {
                name: name.to_string(),
            })
    }

    /// Project directory for `name`, or `None` when it is not registered.
    pub fn resolve_path(&self, name: &str) -> Option<&str> {
        self.get(name).ok().map(|r| r.path.as_str())
    }

    /// Every project directory, sorted.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Repositories ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &Repository> {
        self.repos.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.repos.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }
}

/// `<dir>/<suffix>` with exactly one separator between them; an empty suffix is `dir` itself.
fn git_dir_for(dir: &Path, suffix: &str) -> PathBuf {
    let suffix = suffix.trim_matches(|c: char| c == '/' || c == MAIN_SEPARATOR);
    if suffix.is_empty() {
        dir.to_path_buf()
    } else {
        dir.join(suffix)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
