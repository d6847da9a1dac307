//! Graceful shutdown handling.

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::engine::Engine;

/// Stops the server and the engine task and hands the engine back.
///
/// The engine loop writes any pending flush before it returns, so the state
/// file is current once this resolves.
pub async fn shutdown_gracefully(
    cancel: CancellationToken,
    engine_task: JoinHandle<Engine>,
    server_task: Option<JoinHandle<Result<()>>>,
) -> Result<Engine> {
    cancel.cancel();

    if let Some(server_task) = server_task {
        match server_task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::warn!("Status server stopped with error: {:#}", e),
            Err(e) => log::warn!("Status server task failed: {}", e),
        }
    }

    engine_task.await.context("Engine task failed")
}
