//! Error type definitions.
//!
//! This module defines the error types for fallible operations and the
//! reasons an input can be dropped without failing.

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Error types for reading and writing the persisted engine state.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Filesystem error while reading or writing the state file.
    #[error("State file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The state could not be encoded or the state file is not valid JSON.
    #[error("State encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// The temporary file could not be moved over the state file.
    #[error("State file replace error: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Error types for CSV text that cannot be read or written at all.
///
/// Individual malformed rows are not errors; they are dropped and counted.
#[derive(Error, Debug)]
pub enum CsvError {
    /// The CSV reader or writer failed (e.g. unreadable header).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The CSV writer produced bytes that are not UTF-8.
    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The underlying writer could not be flushed.
    #[error("CSV writer error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons an input is discarded instead of being applied.
///
/// Every variant corresponds to a fail-closed path: the input is ignored and
/// the store stays exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum DropReason {
    /// Observation received while the engine is disabled
    Disabled,
    /// Observation URL could not be parsed as an absolute URL
    MalformedUrl,
    /// User edit addressed an origin / record key that does not exist
    UnknownRecord,
    /// Command with an unrecognized or unparseable type
    UnknownMessage,
    /// CSV row without origin, method or path
    MalformedCsvRow,
    /// CSV `fieldTests` cell that is not a valid field-test mapping
    MalformedFieldTests,
    /// `fieldsChecked = true` requested while the field tests are incomplete
    RejectedFieldsChecked,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DropReason {
    /// Returns a human-readable description of the drop reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::Disabled => "Observation while disabled",
            DropReason::MalformedUrl => "Malformed URL",
            DropReason::UnknownRecord => "Unknown record",
            DropReason::UnknownMessage => "Unknown message",
            DropReason::MalformedCsvRow => "Malformed CSV row",
            DropReason::MalformedFieldTests => "Malformed fieldTests cell",
            DropReason::RejectedFieldsChecked => "Rejected fieldsChecked",
        }
    }

    /// Returns the snake_case key used in JSON status output.
    pub fn key(&self) -> &'static str {
        match self {
            DropReason::Disabled => "disabled",
            DropReason::MalformedUrl => "malformed_url",
            DropReason::UnknownRecord => "unknown_record",
            DropReason::UnknownMessage => "unknown_message",
            DropReason::MalformedCsvRow => "malformed_csv_row",
            DropReason::MalformedFieldTests => "malformed_field_tests",
            DropReason::RejectedFieldsChecked => "rejected_fields_checked",
        }
    }
}
