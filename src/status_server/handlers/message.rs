//! Generic message endpoint.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::super::types::ServerState;
use super::dispatch;
use crate::engine::{Message, Reply};
use crate::error_handling::DropReason;

/// `POST /message`: applies any control message and returns its reply.
///
/// Bodies that are not a well-formed message are counted and rejected with
/// 400; an unrecognized `type` is a successful no-op.
pub async fn message_handler(
    State(state): State<ServerState>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let message: Message = match serde_json::from_value(body) {
        Ok(message) => message,
        Err(e) => {
            log::debug!("Rejecting malformed message: {}", e);
            state.engine.stats().increment(DropReason::UnknownMessage);
            return (StatusCode::BAD_REQUEST, Json(Reply::failed(e))).into_response();
        }
    };
    match dispatch(&state, message).await {
        Ok(reply) => Json(reply).into_response(),
        Err(response) => response,
    }
}
