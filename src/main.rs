//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `endpoint_inventory` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use endpoint_inventory::config::{Cli, Command};
use endpoint_inventory::initialization::init_logger_with;
use endpoint_inventory::{
    run_export, run_import, run_ingest, run_reset, run_server, run_set_enabled, RunReport,
};

#[tokio::main]
async fn main() -> Result<()> {
    // .env may set ENDPOINT_INVENTORY_STATE; a missing file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = cli.config();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    let outcome = match &cli.command {
        Command::Serve { .. } => run_server(&config).await.map(|report| {
            println!(
                "✅ Served {} record{} across {} origin{} for {:.1}s - state saved to {}",
                report.records,
                plural(report.records),
                report.origins,
                plural(report.origins),
                report.elapsed_seconds,
                report.state_path.display()
            );
        }),
        Command::Ingest { file } => run_ingest(&config, file).await.map(|report| {
            println!(
                "✅ Applied {} of {} message{} ({} skipped) - {}",
                report.applied,
                report.lines,
                plural(report.lines),
                report.skipped,
                summary(&report.run)
            );
        }),
        Command::Export(args) => {
            run_export(&config, &args.filter(), args.output.as_deref()).map(|report| {
                if let Some(output) = &report.output {
                    println!(
                        "✅ Exported {} row{} to {}",
                        report.rows,
                        plural(report.rows),
                        output.display()
                    );
                }
            })
        }
        Command::Import { file } => run_import(&config, file).map(|(imported, report)| {
            println!(
                "✅ Imported {} record{} - {}",
                imported,
                plural(imported),
                summary(&report)
            );
        }),
        Command::Reset => run_reset(&config).map(|report| {
            println!("✅ Inventory cleared - {}", summary(&report));
        }),
        Command::SetEnabled { enabled } => run_set_enabled(&config, *enabled).map(|report| {
            println!(
                "✅ Capture {} - {}",
                if report.enabled { "enabled" } else { "disabled" },
                summary(&report)
            );
        }),
    };

    match outcome {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("endpoint_inventory error: {:#}", e);
            process::exit(1);
        }
    }
}

fn summary(report: &RunReport) -> String {
    format!(
        "{} record{} across {} origin{} saved to {}",
        report.records,
        plural(report.records),
        report.origins,
        plural(report.origins),
        report.state_path.display()
    )
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
