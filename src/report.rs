// Change reporter - shows the tail of each patched database

use crate::database::document::render_pretty;
use crate::{PatchError, PatchResult};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Pretty-printed lines of one inserted entry
pub const LINES_PER_EDIT: usize = 12;

/// Extra lines for closing braces around the last entry
pub const TAIL_MARGIN: usize = 3;

/// How many trailing lines cover `edits` appended entries
pub fn tail_len(edits: usize) -> usize {
    edits * LINES_PER_EDIT + TAIL_MARGIN
}

/// Re-read `path` and return its last lines, pretty-printed.
///
/// Entries are appended, so the tail holds what this run inserted.
pub fn render_tail(path: &Path, edits: usize) -> PatchResult<String> {
    let text = fs::read_to_string(path).map_err(|source| PatchError::DbReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|e| PatchError::MalformedDocument {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let pretty = render_pretty(&value, "  ")?;
    let lines: Vec<&str> = pretty.lines().collect();
    let start = lines.len().saturating_sub(tail_len(edits));
    Ok(lines[start..].join("\n"))
}
