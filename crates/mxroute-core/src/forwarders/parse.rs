//! Tokenizer and serializer for forwarder list documents

use super::{ForwarderEntry, SEPARATOR, split_address};
use crate::error::{FormatError, FormatErrorKind};
use std::collections::HashMap;

/// Parse one line of a forwarder list
///
/// `line_no` is 1-based and only used for error reporting. Blank lines and
/// lines starting with `#` yield `Ok(None)`.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<ForwarderEntry>, FormatError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let err = |kind| FormatError::new(line_no, kind);

    let (local, rest) = line
        .split_once(SEPARATOR)
        .ok_or_else(|| err(FormatErrorKind::MissingSeparator))?;
    if rest.contains(SEPARATOR) {
        return Err(err(FormatErrorKind::ExtraSeparator));
    }

    let local = local.trim();
    if split_address(local).is_none() {
        return Err(err(FormatErrorKind::InvalidLocalAddress(local.to_string())));
    }

    let destinations: Vec<&str> = rest
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .collect();
    if destinations.is_empty() {
        return Err(err(FormatErrorKind::NoDestinations));
    }

    Ok(Some(ForwarderEntry::new(local, destinations)))
}

/// Parse a whole forwarder list document
///
/// A leading UTF-8 byte order mark is skipped. Fails on the first malformed
/// line; no partial result is returned. When a
/// local address appears more than once the last line's destinations win,
/// and the entry stays at the position of its first appearance.
pub fn parse(text: &str) -> Result<Vec<ForwarderEntry>, FormatError> {
    let mut entries: Vec<ForwarderEntry> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    // Editors on Windows prepend a byte order mark
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    for (idx, line) in text.lines().enumerate() {
        let Some(entry) = parse_line(idx + 1, line)? else {
            continue;
        };

        match positions.get(&entry.key()) {
            Some(&pos) => {
                tracing::debug!(
                    "Line {} redefines {}, replacing earlier destinations",
                    idx + 1,
                    entry.address()
                );
                entries[pos] = entry;
            }
            None => {
                positions.insert(entry.key(), entries.len());
                entries.push(entry);
            }
        }
    }

    Ok(entries)
}

/// Render entries back to the line format, one newline-terminated line each
pub fn serialize(entries: &[ForwarderEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("{}\n", entry.to_line()))
        .collect()
}
