//! Parser for `ls-tree` output.

use tracing::warn;

use super::TreeEntry;

/// Entries parsed from one `ls-tree` output, plus how many lines were malformed.
#[derive(Debug, Default)]
pub struct ParsedTree {
    pub entries: Vec<TreeEntry>,
    pub skipped: usize,
}

/// Parse one listing line: `<perm> <type> <hash>\t<file>`.
///
/// Tabs are normalized to spaces, then the line is split on the first three
/// spaces only, so the file name keeps its own spaces.
pub fn parse_tree_line(line: &str) -> Option<TreeEntry> {
    let line = line.trim_end().replace('\t', " ");
    let mut parts = line.splitn(4, ' ');
    let perm = parts.next()?;
    let kind = parts.next()?;
    let hash = parts.next()?;
    let file = parts.next()?;
    if perm.is_empty() || kind.is_empty() || hash.is_empty() {
        return None;
    }
    Some(TreeEntry {
        perm: perm.to_string(),
        kind: kind.to_string(),
        hash: hash.to_string(),
        file: file.to_string(),
    })
}

/// Parse a whole listing. Blank lines are ignored; lines without four fields are skipped.
pub fn parse_tree(output: &str) -> ParsedTree {
    let mut parsed = ParsedTree::default();
    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_tree_line(line) {
            Some(entry) => parsed.entries.push(entry),
            None => {
                warn!(line = %line, "skipping malformed tree line");
                parsed.skipped += 1;
            }
        }
    }
    parsed
}
