//! Parsers for ref listings: `rev-parse --symbolic` names and `rev-list` tips.

use tracing::debug;

/// Ref names from one listing, plus how many non-blank lines were not names.
#[derive(Debug, Default)]
pub struct ParsedRefs {
    pub names: Vec<String>,
    pub skipped: usize,
}

/// Ref names, one per line. Lines containing whitespace are diagnostics, not names.
pub fn parse_ref_names(output: &str) -> ParsedRefs {
    let mut parsed = ParsedRefs::default();
    for line in output.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if line.contains(char::is_whitespace) {
            debug!(line = %line, "skipping non-ref line in ref listing");
            parsed.skipped += 1;
            continue;
        }
        parsed.names.push(line.to_string());
    }
    parsed
}

/// First hex object id in `rev-list --max-count=1` output.
pub fn parse_tip(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|l| l.len() >= 4 && l.chars().all(|c| c.is_ascii_hexdigit()))
        .map(str::to_string)
}

/// Display name from the first `committer` header line.
///
/// `committer Jane Doe <jane@example.com> 1700000000 +0100` yields `Jane Doe`.
/// Returns `None` when there is no such line or the name is empty.
pub fn parse_owner(output: &str) -> Option<String> {
    let identity = output
        .lines()
        .map(str::trim)
        .find_map(|l| l.strip_prefix("committer "))?;
    let name = match identity.find(" <") {
        Some(end) => &identity[..end],
        None => identity,
    };
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}
