//! Parser for the commit record protocol (see [`super::LOG_FORMAT`]).

use tracing::warn;

use super::{Commit, RECORD_SENTINEL};

/// Commits parsed from one `rev-list` output, plus how many lines were ignored.
#[derive(Debug, Default)]
pub struct ParsedLog {
    pub commits: Vec<Commit>,
    pub skipped: usize,
}

/// Parse `rev-list --pretty=format:<LOG_FORMAT>` output.
///
/// Parsing rules:
/// - Each line is trimmed before it is looked at
/// - A blank line closes the current record, which is emitted even when empty
/// - The sentinel line is ignored
/// - Any other line is `<descriptor> <value>`; unknown descriptors are skipped
/// - A record not closed by a blank line before end of input is dropped
pub fn parse_log(output: &str) -> ParsedLog {
    let mut parsed = ParsedLog::default();
    let mut current = Commit::default();

    for raw in output.lines() {
        let line = raw.trim();
        if line.is_empty() {
            parsed.commits.push(std::mem::take(&mut current));
            continue;
        }
        if line == RECORD_SENTINEL {
            continue;
        }

        // A field with an empty value (root commit's `parents`) has no separator after trimming.
        let (descriptor, value) = line.split_once(' ').unwrap_or((line, ""));
        let value = value.trim();

        match descriptor {
            "commit" => current.hash = value.to_string(),
            "parents" => {
                current.parents = value.split(' ').filter(|p| !p.is_empty()).map(str::to_string).collect();
            }
            "tree" => current.tree = value.to_string(),
            "author" => current.author = value.to_string(),
            "email" => current.email = value.to_string(),
            "timestamp" => match value.parse() {
                Ok(ts) => current.timestamp = ts,
                Err(_) => {
                    warn!(value = %value, "ignoring non-numeric commit timestamp");
                    parsed.skipped += 1;
                }
            },
            "subject" => current.subject = value.to_string(),
            _ => parsed.skipped += 1,
        }
    }

    if parsed.skipped > 0 {
        warn!(skipped = parsed.skipped, "log output contained unrecognized lines");
    }
    parsed
}
