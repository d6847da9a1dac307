//! Utility functions.
//!
//! This module provides:
//! - Note sanitization (length capping)
//! - Millisecond timestamps and their ISO-8601 rendering

pub mod sanitize;
pub mod time;

pub use sanitize::truncate_note;
pub use time::{format_timestamp, now_millis, parse_timestamp};
