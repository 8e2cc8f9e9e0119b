//! CLI layer: argument parsing, logging setup and command dispatch.
//!
//! Every subcommand prints JSON to stdout; diagnostics go to stderr.

pub mod args;

pub use args::*;

use std::io::Write;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::{BrowseError, Browser, CancelFlag, SubprocessEngine};

// ─── CLI ─────────────────────────────────────────────────────────────

/// Browse history, trees, diffs and hit counters of a directory of git repositories
#[derive(Parser, Debug)]
#[command(
    name = "gitbrowse",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATETIME"), ")"),
    about,
    after_help = "\
Run 'gitbrowse <COMMAND> --help' for detailed options.\n\
Common options: -r <DIR> (repository root), --suffix <S> (git dir suffix)"
)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// List browsable repositories with their owners
    Repos,

    /// List commits
    Log(LogArgs),

    /// Show one commit record
    Show(CommitArgs),

    /// List a tree
    Tree(TreeArgs),

    /// Split a commit's changes into per-file blocks
    Diff(CommitArgs),

    /// List branches (or tags) with their tip commits
    Refs(RefsArgs),

    /// Read (and optionally bump) hit counters
    Stats(StatsArgs),
}

// ─── Main entry point ───────────────────────────────────────────────

pub fn run() {
    let cli = Cli::parse();
    init_logging(&cli.global.log_level);

    let cancel = CancelFlag::new();
    let on_interrupt = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || on_interrupt.cancel()) {
        warn!(error = %e, "could not install Ctrl-C handler");
    }

    let config = cli.global.to_config();
    let engine = SubprocessEngine::from_config(&config).with_cancel(cancel);
    let browser = Browser::with_engine(config, engine);

    if let Err(e) = dispatch(&browser, cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(if e.is_not_found() { 2 } else { 1 });
    }
}

fn dispatch(browser: &Browser, command: Commands) -> Result<(), BrowseError> {
    match command {
        Commands::Repos => print_json(&browser.projects().collect::<Vec<_>>()),
        Commands::Log(args) => {
            let query = args.query();
            if args.dry_run {
                println!("{}", browser.log_command(&args.project, &query)?);
                Ok(())
            } else {
                print_json(&browser.list_commits(&args.project, &query)?)
            }
        }
        Commands::Show(args) => print_json(&browser.commit(&args.project, &args.commit)?),
        Commands::Tree(args) => print_json(&browser.tree(&args.project, &args.treeish)?),
        Commands::Diff(args) => print_json(&browser.diff(&args.project, &args.commit)?),
        Commands::Refs(args) => {
            let refs = if args.tags {
                browser.tags(&args.project)?
            } else {
                browser.branches(&args.project)?
            };
            print_json(&refs)
        }
        Commands::Stats(args) => print_json(&browser.stats(&args.project, args.hit)?),
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

/// stderr logging. `RUST_LOG` wins over `--log-level` when set.
fn init_logging(level: &str) {
    let level = match level {
        "error" => tracing::Level::ERROR,
        "warn" => tracing::Level::WARN,
        "info" => tracing::Level::INFO,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => tracing::Level::WARN,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), BrowseError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}
