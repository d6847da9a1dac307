//! Snapshot endpoint.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};

use super::super::types::ServerState;
use super::dispatch;
use crate::engine::Message;

/// `GET /data`: the whole store as `{ data: { origin: [records] } }`.
pub async fn data_handler(State(state): State<ServerState>) -> Response {
    match dispatch(&state, Message::GetData).await {
        Ok(reply) => Json(reply).into_response(),
        Err(response) => response,
    }
}
