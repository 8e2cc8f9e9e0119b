//! Browse history, trees, diffs and hit counters of a directory of git repositories.
//!
//! Binary crate entry point. All CLI logic is in the `cli` module.

// mimalloc returns freed pages to the OS promptly; output buffers for large
// histories come and go on every query.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() {
    gitbrowse::cli::run();
}
