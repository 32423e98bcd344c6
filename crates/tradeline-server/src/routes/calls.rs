//! Call Debug Routes
//!
//! Read-only views over the call store.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use tradeline::DomainError;

use crate::models::{CallRecordResponse, ErrorResponse, PolishedCallResponse};
use crate::AppState;

/// List every call record
#[utoipa::path(
    get,
    path = "/webhooks/voice/all-calls",
    responses(
        (status = 200, description = "All call records", body = Vec<CallRecordResponse>),
        (status = 401, description = "Missing or invalid API key"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Calls"
)]
pub async fn all_calls(
    State(state): State<AppState>,
) -> Result<Json<Vec<CallRecordResponse>>, (StatusCode, String)> {
    let records = state
        .calls
        .list_calls()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(
        records
            .into_iter()
            .map(CallRecordResponse::from_domain)
            .collect(),
    ))
}

/// Extracted summary of every call
#[utoipa::path(
    get,
    path = "/webhooks/voice/all-calls/polished",
    responses(
        (status = 200, description = "Summaries, or an error body when no calls exist", body = Vec<PolishedCallResponse>),
        (status = 401, description = "Missing or invalid API key"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Calls"
)]
pub async fn polished_calls(State(state): State<AppState>) -> Response {
    match state.calls.polished_calls().await {
        Ok(summaries) => Json(
            summaries
                .into_iter()
                .map(PolishedCallResponse::from_domain)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e @ DomainError::NoCalls) => {
            (StatusCode::OK, Json(ErrorResponse::new(e.to_string()))).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/webhooks/voice/all-calls", get(all_calls))
        .route("/webhooks/voice/all-calls/polished", get(polished_calls))
}
