//! Long-running service: engine task plus local HTTP surface.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::app::shutdown_gracefully;
use crate::config::Config;
use crate::engine::run_engine;
use crate::persistence::StateSink;
use crate::status_server::{start_status_server, ServerState};

use super::finalize::finalize_run;
use super::init::open_engine;
use super::RunReport;

/// Serves the engine on 127.0.0.1 until Ctrl-C.
///
/// Mutations are flushed to the state file once they have been quiet for
/// `config.flush_interval`; whatever is still pending at shutdown is written
/// before returning.
pub async fn run_server(config: &Config) -> Result<RunReport> {
    let start_time = Instant::now();
    let (engine, sink) = open_engine(config)?;
    let shutdown = CancellationToken::new();

    let engine_sink: Arc<dyn StateSink> = sink.clone();
    let (handle, engine_task) = run_engine(engine, engine_sink, shutdown.clone());

    let state = ServerState::new(handle);
    let port = config.port;
    let server_shutdown = shutdown.clone();
    let mut server_task =
        tokio::spawn(async move { start_status_server(port, state, server_shutdown).await });

    let server_exit = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!("Failed to listen for Ctrl-C: {}", e);
            }
            info!("Shutdown requested");
            None
        }
        joined = &mut server_task => Some(joined),
    };

    let still_running = server_exit.is_none().then_some(server_task);
    let mut engine = shutdown_gracefully(shutdown, engine_task, still_running).await?;
    if let Some(joined) = server_exit {
        joined.context("Status server task failed")??;
    }

    finalize_run(&mut engine, &*sink, &config.state_path, start_time)
}
