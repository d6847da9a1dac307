//! JSON-lines ingestion.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::app::log_progress;
use crate::config::{Config, INGEST_LOGGING_INTERVAL};
use crate::engine::{Engine, Message};
use crate::error_handling::DropReason;

use super::finalize::finalize_run;
use super::init::open_engine;
use super::IngestReport;

/// Applies one message per line from `source` (`-` for stdin), in order, then
/// writes the state.
///
/// Blank lines and lines starting with `#` are skipped. Lines that are not a
/// valid message are counted and skipped.
pub async fn run_ingest(config: &Config, source: &Path) -> Result<IngestReport> {
    let start_time = Instant::now();
    let (mut engine, sink) = open_engine(config)?;

    let (lines, applied, skipped) = if source.as_os_str() == "-" {
        info!("Reading messages from stdin");
        let reader = BufReader::new(tokio::io::stdin());
        ingest_lines(&mut engine, reader, start_time).await?
    } else {
        let file = tokio::fs::File::open(source)
            .await
            .with_context(|| format!("Failed to open input file {}", source.display()))?;
        ingest_lines(&mut engine, BufReader::new(file), start_time).await?
    };
    log_progress(start_time, lines);

    let run = finalize_run(&mut engine, &*sink, &config.state_path, start_time)?;
    Ok(IngestReport {
        lines,
        applied,
        skipped,
        run,
    })
}

/// Returns `(lines, applied, skipped)`.
pub(crate) async fn ingest_lines<R>(
    engine: &mut Engine,
    reader: R,
    start_time: Instant,
) -> Result<(usize, usize, usize)>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let (mut total, mut applied, mut skipped) = (0usize, 0usize, 0usize);

    while let Some(line) = lines.next_line().await.context("Failed to read input line")? {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        total += 1;
        match serde_json::from_str::<Message>(trimmed) {
            Ok(message) => {
                engine.handle(message);
                applied += 1;
            }
            Err(e) => {
                log::debug!("Skipping line {}: {}", total, e);
                engine.stats().increment(DropReason::UnknownMessage);
                skipped += 1;
            }
        }
        if total % INGEST_LOGGING_INTERVAL == 0 {
            log_progress(start_time, total);
        }
    }
    Ok((total, applied, skipped))
}
