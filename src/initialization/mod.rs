//! Process-level setup.
//!
//! The only global resource is the logger; everything else (engine, sink,
//! server) is constructed explicitly by the subcommand runners in `app`.

mod logger;

// Re-export public API
pub use logger::init_logger_with;
