//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (debounce window, size limits, placeholder tokens)
//! - The library `Config` struct
//! - Log level / format option types shared with the CLI
//! - The command-line interface parsed by the binary

mod cli;
mod constants;
mod types;

pub use cli::{Cli, Command, ExportArgs};

// Re-export all constants
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel};
