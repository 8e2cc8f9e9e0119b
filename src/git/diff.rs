//! Splits `show --format=%b` output into one block per changed file.
//!
//! Lines before a file's first `@@` go to its summary; from the first `@@`
//! on, lines go to its hunk body until the next `diff` line starts a new
//! file. Text preceding the first `diff` header (the commit message body)
//! therefore lands in the first block's summary.

use super::DiffBlock;

/// Start of a file's change header.
const FILE_MARKER: &str = "diff";
/// Start of a hunk.
const HUNK_MARKER: &str = "@@ ";

/// Parse one commit's change output. Always returns at least one block.
///
/// Trailing whitespace is stripped from each line and empty lines are dropped.
pub fn parse_diff(output: &str) -> Vec<DiffBlock> {
    let mut blocks = Vec::new();
    let mut in_hunk = false;
    let mut summary: Vec<&str> = Vec::new();
    let mut file: Vec<&str> = Vec::new();

    for line in output.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        if in_hunk {
            if line.starts_with(FILE_MARKER) {
                blocks.push(block(&summary, &file));
                summary.clear();
                file.clear();
                summary.push(line);
                in_hunk = false;
            } else {
                file.push(line);
            }
        } else if line.starts_with(HUNK_MARKER) {
            in_hunk = true;
            file.push(line);
        } else {
            summary.push(line);
        }
    }

    blocks.push(block(&summary, &file));
    blocks
}

fn block(summary: &[&str], file: &[&str]) -> DiffBlock {
    DiffBlock {
        summary: summary.join("\n"),
        file: file.join("\n"),
    }
}
