//! Command-line interface.
//!
//! Parsed by the binary and turned into a [`Config`] plus a [`Command`].

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::constants::{DEFAULT_FLUSH_INTERVAL_MS, DEFAULT_PORT, DEFAULT_STATE_PATH};
use crate::config::types::{Config, LogFormat, LogLevel};
use crate::export::{ExportFilter, TestedFilter};

/// Passive endpoint inventory.
#[derive(Debug, Parser)]
#[command(name = "endpoint_inventory", version, about)]
pub struct Cli {
    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    pub log_format: LogFormat,

    /// JSON file the inventory is persisted to
    #[arg(long, default_value = DEFAULT_STATE_PATH, global = true, env = "ENDPOINT_INVENTORY_STATE")]
    pub state_path: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the engine on 127.0.0.1 until Ctrl-C
    Serve {
        /// Port of the local HTTP surface
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Quiet period before pending changes are written, in milliseconds
        #[arg(long, default_value_t = DEFAULT_FLUSH_INTERVAL_MS)]
        flush_ms: u64,
    },
    /// Apply JSON-lines messages from a file (`-` for stdin)
    Ingest {
        file: PathBuf,
    },
    /// Export the inventory as CSV
    Export(ExportArgs),
    /// Replace the inventory with the rows of a CSV file
    Import {
        file: PathBuf,
    },
    /// Delete every record
    Reset,
    /// Turn capture on or off
    SetEnabled {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Output file (stdout if omitted)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// Only this origin, e.g. https://api.example.com
    #[arg(long)]
    pub origin: Option<String>,
    /// Only this HTTP method
    #[arg(long)]
    pub method: Option<String>,
    /// Only records that have seen this status code
    #[arg(long)]
    pub status: Option<u16>,
    /// Only tested or only untested records
    #[arg(long, value_enum)]
    pub tested: Option<TestedFilter>,
    /// Drop records that look like static assets
    #[arg(long)]
    pub hide_assets: bool,
    /// Case-insensitive search over origin, method and path
    #[arg(long)]
    pub search: Option<String>,
}

impl ExportArgs {
    pub fn filter(&self) -> ExportFilter {
        ExportFilter {
            origin: self.origin.clone(),
            method: self.method.clone(),
            status: self.status,
            tested: self.tested,
            search: self.search.clone(),
            hide_assets: self.hide_assets,
        }
    }
}

impl Cli {
    /// Library configuration for this invocation.
    pub fn config(&self) -> Config {
        let mut config = Config {
            state_path: self.state_path.clone(),
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
            ..Default::default()
        };
        if let Command::Serve { port, flush_ms } = self.command {
            config.port = port;
            config.flush_interval = std::time::Duration::from_millis(flush_ms);
        }
        config
    }
}
