//! Run finalization.

use std::time::Instant;

use anyhow::{Context, Result};

use crate::app::print_drop_statistics;
use crate::engine::Engine;
use crate::persistence::StateSink;

use super::RunReport;

/// Writes the state, prints drop statistics and builds the report.
pub(crate) fn finalize_run(
    engine: &mut Engine,
    sink: &dyn StateSink,
    state_path: &std::path::Path,
    start_time: Instant,
) -> Result<RunReport> {
    engine
        .flush_now(sink)
        .with_context(|| format!("Failed to write state to {}", state_path.display()))?;

    print_drop_statistics(engine.stats());

    Ok(RunReport {
        origins: engine.store().origin_count(),
        records: engine.store().record_count(),
        enabled: engine.is_enabled(),
        dropped: engine.stats().total(),
        state_path: state_path.to_path_buf(),
        elapsed_seconds: start_time.elapsed().as_secs_f64(),
    })
}
