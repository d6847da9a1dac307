//! Local HTTP surface for the inventory engine.
//!
//! Provides these endpoints:
//! - `POST /message` - any control message, answered with its reply
//! - `GET /data` - the full store snapshot
//! - `GET /status` - capture flag, store size and drop counters
//! - `GET /export.csv` - CSV export, filtered by query parameters
//! - `POST /import` - full-replace CSV import from the request body
//!
//! The server binds to 127.0.0.1 only and forwards every request to the
//! engine task, which stays the single writer.

mod handlers;
mod types;

use axum::routing::{get, post};
use axum::Router;
use tokio_util::sync::CancellationToken;

use handlers::{data_handler, export_handler, import_handler, message_handler, status_handler};
pub use types::{DropCounts, ServerState, StatusResponse};

/// Builds the router without binding a socket.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/message", post(message_handler))
        .route("/data", get(data_handler))
        .route("/status", get(status_handler))
        .route("/export.csv", get(export_handler))
        .route("/import", post(import_handler))
        .with_state(state)
}

/// Creates and starts the status server; returns once `shutdown` is cancelled.
pub async fn start_status_server(
    port: u16,
    state: ServerState,
    shutdown: CancellationToken,
) -> Result<(), anyhow::Error> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind status server to port {}: {}", port, e))?;

    log::info!("Status server listening on http://127.0.0.1:{}/", port);
    log::info!("  - Messages: POST http://127.0.0.1:{}/message", port);
    log::info!("  - Status: http://127.0.0.1:{}/status", port);
    log::info!("  - Export: http://127.0.0.1:{}/export.csv", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| anyhow::anyhow!("Status server error: {}", e))?;

    Ok(())
}
