//! One-shot maintenance commands: export, import, reset, enable/disable.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::config::Config;
use crate::export::{self, ExportFilter};
use crate::utils::now_millis;

use super::finalize::finalize_run;
use super::init::open_engine;
use super::{ExportReport, RunReport};

/// Writes the filtered store as CSV to `output`, or stdout when `None`.
///
/// Read-only: the state file is not rewritten.
pub fn run_export(config: &Config, filter: &ExportFilter, output: Option<&Path>) -> Result<ExportReport> {
    let (engine, _sink) = open_engine(config)?;
    let csv = engine.export_csv(filter).context("Failed to encode CSV")?;
    let rows = engine
        .store()
        .iter()
        .filter(|(origin, record)| filter.matches(origin, record))
        .count();

    match output {
        Some(path) => {
            std::fs::write(path, csv)
                .with_context(|| format!("Failed to write CSV to {}", path.display()))?;
            info!("Exported {} row(s) to {}", rows, path.display());
        }
        None => print!("{csv}"),
    }

    Ok(ExportReport {
        rows,
        output: output.map(PathBuf::from),
    })
}

/// Replaces the store with the rows of the CSV file at `input`.
///
/// A file without a single usable row leaves the store untouched.
pub fn run_import(config: &Config, input: &Path) -> Result<(usize, RunReport)> {
    let start_time = Instant::now();
    let (mut engine, sink) = open_engine(config)?;
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read CSV file {}", input.display()))?;

    let entries = export::import_csv(&text, engine.stats(), now_millis())
        .with_context(|| format!("Failed to parse CSV file {}", input.display()))?;
    let imported = if entries.is_empty() {
        warn!("No usable rows in {}, keeping the current store", input.display());
        0
    } else {
        engine.replace_entries(entries)
    };

    let report = finalize_run(&mut engine, &*sink, &config.state_path, start_time)?;
    Ok((imported, report))
}

/// Deletes every record; the enabled flag is kept.
pub fn run_reset(config: &Config) -> Result<RunReport> {
    let start_time = Instant::now();
    let (mut engine, sink) = open_engine(config)?;
    engine.reset();
    finalize_run(&mut engine, &*sink, &config.state_path, start_time)
}

/// Turns capture on or off.
pub fn run_set_enabled(config: &Config, enabled: bool) -> Result<RunReport> {
    let start_time = Instant::now();
    let (mut engine, sink) = open_engine(config)?;
    engine.set_enabled(enabled);
    finalize_run(&mut engine, &*sink, &config.state_path, start_time)
}
