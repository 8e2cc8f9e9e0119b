//! Runtime configuration: where repositories live, how git is invoked,
//! where hit counters are kept.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default directory name appended to a project directory to reach its git dir.
pub const DEFAULT_REPO_SUFFIX: &str = ".git";

/// Default engine deadline.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseConfig {
    /// Directory holding one subdirectory per project.
    pub repo_root: PathBuf,
    /// Appended to `<repo_root>/<project>/` to locate the git dir (`HEAD` lives there).
    pub repo_suffix: String,
    /// Program used for every engine invocation.
    pub git_binary: String,
    /// Root of the hit-counter cache.
    pub cache_dir: PathBuf,
    /// Engine invocations running longer than this are killed (0 = no deadline).
    pub timeout_secs: u64,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            repo_root: PathBuf::from("."),
            repo_suffix: DEFAULT_REPO_SUFFIX.to_string(),
            git_binary: "git".to_string(),
            cache_dir: default_cache_dir(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl BrowseConfig {
    /// Default configuration rooted at `repo_root`.
    pub fn with_root(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
            ..Self::default()
        }
    }

    /// Engine deadline, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Platform cache directory for counters, e.g. `~/.cache/gitbrowse` on Linux.
pub fn default_cache_dir() -> PathBuf {
    match dirs::cache_dir() {
        Some(base) => base.join("gitbrowse"),
        None => PathBuf::from(".gitbrowse-cache"),
    }
}
