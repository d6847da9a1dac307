//! Status server HTTP handlers.

mod csv;
mod data;
mod message;
mod status;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::types::ServerState;
use crate::engine::{Message, Reply};

pub use self::csv::{export_handler, import_handler};
pub use data::data_handler;
pub use message::message_handler;
pub use status::status_handler;

/// Sends `message` to the engine, mapping a stopped engine to 503.
async fn dispatch(state: &ServerState, message: Message) -> Result<Reply, Response> {
    state.engine.send(message).await.ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(Reply::failed("engine is not running")),
        )
            .into_response()
    })
}
