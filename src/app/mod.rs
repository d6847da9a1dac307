//! Support code for the subcommand runners: progress logging, shutdown
//! handling and statistics printing.

pub mod logging;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use logging::log_progress;
pub use shutdown::shutdown_gracefully;
pub use statistics::print_drop_statistics;
