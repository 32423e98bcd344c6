//! Tradeline API Routes
//!
//! - /webhooks/voice/ivr-* - IVR menu, voicemail recording and transcription
//! - /webhooks/voice/incoming, /transcription-available - Scripted intake
//! - /webhooks/voice/va-* - Virtual assistant intake and recording status
//! - /webhooks/voice/all-calls - Debug views (API key protected)

pub mod calls;
pub mod swagger;
pub mod voice;

use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::models::ErrorResponse;

/// Fallback for unmatched routes
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Route not found")),
    )
}
