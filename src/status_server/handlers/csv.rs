//! CSV export and import endpoints.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::super::types::ServerState;
use super::dispatch;
use crate::engine::{Message, Reply};
use crate::export::ExportFilter;

/// `GET /export.csv?origin=..&method=..&status=..&tested=..&search=..&hideAssets=..`
pub async fn export_handler(
    State(state): State<ServerState>,
    Query(filter): Query<ExportFilter>,
) -> Response {
    match dispatch(&state, Message::ExportCsv { filter }).await {
        Ok(Reply::Csv { csv }) => (
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            csv,
        )
            .into_response(),
        Ok(reply) => (StatusCode::INTERNAL_SERVER_ERROR, Json(reply)).into_response(),
        Err(response) => response,
    }
}

/// `POST /import`: replaces the whole store with the CSV request body.
pub async fn import_handler(State(state): State<ServerState>, body: String) -> Response {
    match dispatch(&state, Message::ImportCsv { csv: body }).await {
        Ok(reply @ Reply::Imported { .. }) => Json(reply).into_response(),
        Ok(reply) => (StatusCode::BAD_REQUEST, Json(reply)).into_response(),
        Err(response) => response,
    }
}
