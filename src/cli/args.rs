//! CLI argument structs for all subcommands.

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::config::{DEFAULT_REPO_SUFFIX, DEFAULT_TIMEOUT_SECS};
use crate::{BrowseConfig, LogQuery};

/// Options shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Directory containing one subdirectory per project
    #[arg(short, long, env = "GITBROWSE_ROOT", default_value = ".", global = true)]
    pub root: PathBuf,

    /// Appended to each project directory to reach its git dir
    #[arg(long, env = "GITBROWSE_SUFFIX", default_value = DEFAULT_REPO_SUFFIX, global = true)]
    pub suffix: String,

    /// git executable
    #[arg(long = "git", env = "GITBROWSE_GIT", default_value = "git", global = true)]
    pub git_binary: String,

    /// Hit-counter cache directory (default: platform cache dir)
    #[arg(long, env = "GITBROWSE_CACHE_DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Kill git after this many seconds (0 = no limit)
    #[arg(long, env = "GITBROWSE_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout: u64,

    /// Log level for stderr output (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,
}

impl GlobalArgs {
    pub fn to_config(&self) -> BrowseConfig {
        let defaults = BrowseConfig::default();
        BrowseConfig {
            repo_root: self.root.clone(),
            repo_suffix: self.suffix.clone(),
            git_binary: self.git_binary.clone(),
            cache_dir: self.cache_dir.clone().unwrap_or(defaults.cache_dir),
            timeout_secs: self.timeout,
        }
    }
}

#[derive(Parser, Debug)]
pub struct LogArgs {
    /// Project name
    pub project: String,

    /// Range start (with --count 1: the commit to fetch)
    #[arg(long, default_value = "HEAD")]
    pub since: String,

    /// Range end
    #[arg(long, default_value = "HEAD")]
    pub until: String,

    /// Maximum number of commits
    #[arg(short = 'n', long, default_value = "10")]
    pub count: usize,

    /// Extra rev-list flag without the leading `--` (repeatable, e.g. -p topo-order)
    #[arg(short, long = "param")]
    pub params: Vec<String>,

    /// Print the git command instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

impl LogArgs {
    pub fn query(&self) -> LogQuery {
        LogQuery {
            since: self.since.clone(),
            until: self.until.clone(),
            count: self.count,
            params: self.params.clone(),
        }
    }
}

#[derive(Parser, Debug)]
pub struct CommitArgs {
    /// Project name
    pub project: String,

    /// Commit hash or ref
    pub commit: String,
}

#[derive(Parser, Debug)]
pub struct TreeArgs {
    /// Project name
    pub project: String,

    /// Branch, commit or tree id
    #[arg(default_value = "master")]
    pub treeish: String,
}

#[derive(Parser, Debug)]
pub struct RefsArgs {
    /// Project name
    pub project: String,

    /// List tags instead of branches
    #[arg(long)]
    pub tags: bool,
}

#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Project name
    pub project: String,

    /// Count this call as a page view
    #[arg(long)]
    pub hit: bool,
}
