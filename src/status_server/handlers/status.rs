//! JSON status handler.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};

use super::super::types::{DropCounts, ServerState, StatusResponse};
use super::dispatch;
use crate::engine::{Message, Reply};

/// JSON status endpoint: capture flag, store size and drop counters
pub async fn status_handler(State(state): State<ServerState>) -> Response {
    let (enabled, origins, records, tested_records) =
        match dispatch(&state, Message::GetStatus).await {
            Ok(Reply::Status {
                enabled,
                origins,
                records,
                tested_records,
            }) => (enabled, origins, records, tested_records),
            Ok(_) => (false, 0, 0, 0),
            Err(response) => return response,
        };

    let stats = state.engine.stats();
    let response = StatusResponse {
        enabled,
        origins,
        records,
        tested_records,
        uptime_seconds: state.start_time.elapsed().as_secs_f64(),
        dropped: DropCounts {
            total: stats.total(),
            by_reason: stats.snapshot(),
        },
    };
    Json(response).into_response()
}
