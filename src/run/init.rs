//! Engine setup shared by every subcommand.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::engine::Engine;
use crate::persistence::JsonFileSink;

/// Loads the engine from `config.state_path`.
///
/// A missing state file yields an empty, disabled engine; an unreadable or
/// corrupt one is an error.
pub fn open_engine(config: &Config) -> Result<(Engine, Arc<JsonFileSink>)> {
    let sink = Arc::new(JsonFileSink::new(&config.state_path));
    let engine = Engine::load(&*sink, config.flush_interval).with_context(|| {
        format!(
            "Failed to load state from {}",
            config.state_path.display()
        )
    })?;
    Ok((engine, sink))
}
