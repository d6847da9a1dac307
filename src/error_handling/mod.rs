//! Error handling and drop statistics.
//!
//! This module provides:
//! - Error type definitions for the few operations that can actually fail
//!   (logger setup, state persistence, unreadable CSV input)
//! - Drop statistics: every observation, row or command that the engine
//!   discards instead of failing is counted by reason
//!
//! Core operations never surface malformed input to the caller. They drop the
//! offending item, count it here, and leave the store untouched.

mod stats;
mod types;

// Re-export public API
pub use stats::DropStats;
pub use types::{CsvError, DropReason, InitializationError, PersistenceError};
