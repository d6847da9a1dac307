//! Utilities for sanitizing user-supplied text before it is stored.

use crate::config::MAX_NOTE_CHARS;

/// Truncates a note to `MAX_NOTE_CHARS` characters.
///
/// Counts characters, not bytes, so multi-byte text is never split inside a
/// code point.
pub fn truncate_note(note: &str) -> String {
    match note.char_indices().nth(MAX_NOTE_CHARS) {
        Some((byte_idx, _)) => note[..byte_idx].to_string(),
        None => note.to_string(),
    }
}
