//! Configuration constants.
//!
//! This module defines the constants used throughout the engine: placeholder
//! tokens produced by the normalizer, size limits on user-supplied text, and
//! defaults for persistence and the local status server.

use std::time::Duration;

// Normalization
/// Placeholder substituted for identifier-like path segments.
pub const ID_PLACEHOLDER: &str = ":id";
/// Placeholder rendered for every key in a query skeleton.
pub const PARAM_PLACEHOLDER: &str = ":param";
/// Maximum URL length accepted from the observation feed (in bytes).
/// Longer URLs are dropped the same way malformed URLs are.
pub const MAX_URL_LENGTH: usize = 8192;

// Notes and form tracking
/// Maximum note length in characters. Longer notes are truncated.
pub const MAX_NOTE_CHARS: usize = 2000;
/// Number of distinct field names listed in an auto-populated note.
pub const AUTO_NOTE_FIELD_LIMIT: usize = 12;
/// Prefix of the auto-populated note written by a form scan.
pub const AUTO_NOTE_PREFIX: &str = "Detected form fields: ";
/// Field name used in field keys when a field has neither a name nor an id.
pub const UNNAMED_FIELD: &str = "(unnamed)";
/// Resource type recorded for the implicit GET observation of a form scan.
pub const FORM_SCAN_RESOURCE_TYPE: &str = "document";

// Persistence
/// Default debounce window for persistence flushes, in milliseconds.
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 300;
/// Default debounce window for persistence flushes.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(DEFAULT_FLUSH_INTERVAL_MS);
/// Default path of the JSON state file.
pub const DEFAULT_STATE_PATH: &str = "./endpoint_inventory.json";

// Status server
/// Default port of the local status server (bound to 127.0.0.1 only).
pub const DEFAULT_PORT: u16 = 7878;
/// Capacity of the engine command channel.
pub const ENGINE_CHANNEL_CAPACITY: usize = 1024;

// CLI runs
/// Number of ingested lines between progress log lines.
pub const INGEST_LOGGING_INTERVAL: usize = 10_000;
