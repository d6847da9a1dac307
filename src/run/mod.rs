//! Subcommand runners.
//!
//! Each runner opens the engine from the state file, does its work, writes
//! the state back and returns a small report for the CLI to print.

mod finalize;
mod ingest;
mod init;
mod maintenance;
mod serve;

use std::path::PathBuf;

pub use ingest::run_ingest;
pub use init::open_engine;
pub use maintenance::{run_export, run_import, run_reset, run_set_enabled};
pub use serve::run_server;

/// Summary of a finished run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Origins in the store when the run finished
    pub origins: usize,
    /// Records in the store when the run finished
    pub records: usize,
    /// Whether capture was enabled when the run finished
    pub enabled: bool,
    /// Inputs dropped during the run, all reasons
    pub dropped: usize,
    /// Where the state was written
    pub state_path: PathBuf,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

/// Result of `ingest`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    /// Non-blank, non-comment input lines
    pub lines: usize,
    /// Lines that parsed as messages and were applied
    pub applied: usize,
    /// Lines that were not valid messages
    pub skipped: usize,
    pub run: RunReport,
}

/// Result of `export`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportReport {
    /// Data rows written (header excluded)
    pub rows: usize,
    /// `None` when written to stdout
    pub output: Option<PathBuf>,
}
