//! Voice Webhook Routes
//!
//! HTTP handlers that delegate to the ConversationDriver and render its
//! reply as TwiML.

use axum::{extract::State, http::StatusCode, routing::post, Router};

use tradeline::{DomainError, VoiceReply};

use crate::application::error_reply;
use crate::config::VoiceSettings;
use crate::models::{CallbackForm, Twiml};
use crate::AppState;

type TwimlResult = Result<Twiml, (StatusCode, String)>;

/// Store failures fail the request so the provider retries; anything else
/// ends the call politely.
fn respond(voice: &VoiceSettings, reply: Result<VoiceReply, DomainError>) -> TwimlResult {
    match reply {
        Ok(reply) => Ok(Twiml::render(&reply, voice)),
        Err(e) if e.is_store_failure() => {
            tracing::error!("Voice webhook failed: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
        Err(e) => {
            tracing::warn!("Voice webhook degraded to apology: {}", e);
            Ok(Twiml::render(&error_reply(), voice))
        }
    }
}

/// IVR greeting menu
#[utoipa::path(
    post,
    path = "/webhooks/voice/ivr-incoming",
    responses(
        (status = 200, description = "TwiML menu", content_type = "text/xml", body = String)
    ),
    tag = "Voice"
)]
pub async fn ivr_incoming(State(state): State<AppState>, form: CallbackForm) -> TwimlResult {
    respond(&state.voice, state.driver.ivr_incoming(&form).await)
}

/// IVR digit handling
#[utoipa::path(
    post,
    path = "/webhooks/voice/ivr-selection",
    responses(
        (status = 200, description = "TwiML for the chosen option", content_type = "text/xml", body = String)
    ),
    tag = "Voice"
)]
pub async fn ivr_selection(State(state): State<AppState>, form: CallbackForm) -> TwimlResult {
    respond(&state.voice, state.driver.ivr_selection(&form).await)
}

/// Voicemail recording stored
#[utoipa::path(
    post,
    path = "/webhooks/voice/ivr-recording-completed",
    responses(
        (status = 200, description = "TwiML goodbye", content_type = "text/xml", body = String),
        (status = 500, description = "Call store unavailable")
    ),
    tag = "Voice"
)]
pub async fn ivr_recording_completed(
    State(state): State<AppState>,
    form: CallbackForm,
) -> TwimlResult {
    respond(&state.voice, state.driver.ivr_recording_completed(&form).await)
}

/// Voicemail transcript stored
#[utoipa::path(
    post,
    path = "/webhooks/voice/ivr-transcription-completed",
    responses(
        (status = 200, description = "TwiML goodbye", content_type = "text/xml", body = String),
        (status = 500, description = "Call store unavailable")
    ),
    tag = "Voice"
)]
pub async fn ivr_transcription_completed(
    State(state): State<AppState>,
    form: CallbackForm,
) -> TwimlResult {
    respond(&state.voice, state.driver.ivr_transcription_completed(&form).await)
}

/// Scripted intake start
#[utoipa::path(
    post,
    path = "/webhooks/voice/incoming",
    responses(
        (status = 200, description = "TwiML greeting", content_type = "text/xml", body = String),
        (status = 500, description = "Call store unavailable")
    ),
    tag = "Voice"
)]
pub async fn incoming(State(state): State<AppState>, form: CallbackForm) -> TwimlResult {
    respond(&state.voice, state.driver.scripted_incoming(&form).await)
}

/// Scripted step capture
#[utoipa::path(
    post,
    path = "/webhooks/voice/transcription-available",
    params(
        ("step" = String, Query, description = "job-details, address-details or final-notes")
    ),
    responses(
        (status = 200, description = "TwiML for the next step", content_type = "text/xml", body = String),
        (status = 500, description = "Call store unavailable")
    ),
    tag = "Voice"
)]
pub async fn transcription_available(
    State(state): State<AppState>,
    form: CallbackForm,
) -> TwimlResult {
    respond(&state.voice, state.driver.capture_step(&form).await)
}

/// Assistant intake start
#[utoipa::path(
    post,
    path = "/webhooks/voice/va-incoming",
    responses(
        (status = 200, description = "TwiML greeting", content_type = "text/xml", body = String),
        (status = 500, description = "Call store unavailable")
    ),
    tag = "Voice"
)]
pub async fn va_incoming(State(state): State<AppState>, form: CallbackForm) -> TwimlResult {
    respond(&state.voice, state.driver.assistant_incoming(&form).await)
}

/// Assistant turn
#[utoipa::path(
    post,
    path = "/webhooks/voice/va-transcription-available",
    responses(
        (status = 200, description = "TwiML for the agent's reply", content_type = "text/xml", body = String),
        (status = 500, description = "Call store unavailable")
    ),
    tag = "Voice"
)]
pub async fn va_transcription_available(
    State(state): State<AppState>,
    form: CallbackForm,
) -> TwimlResult {
    respond(&state.voice, state.driver.assistant_turn(&form).await)
}

/// Recording status callback for both branches
#[utoipa::path(
    post,
    path = "/webhooks/voice/va-recording-post",
    responses(
        (status = 200, description = "Acknowledged"),
        (status = 500, description = "Call store unavailable")
    ),
    tag = "Voice"
)]
pub async fn va_recording_post(
    State(state): State<AppState>,
    form: CallbackForm,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .driver
        .recording_status(&form)
        .await
        .map(|()| StatusCode::OK)
        .map_err(|e| {
            tracing::error!("Recording callback failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/webhooks/voice/ivr-incoming", post(ivr_incoming))
        .route("/webhooks/voice/ivr-selection", post(ivr_selection))
        .route(
            "/webhooks/voice/ivr-recording-completed",
            post(ivr_recording_completed),
        )
        .route(
            "/webhooks/voice/ivr-transcription-completed",
            post(ivr_transcription_completed),
        )
        .route("/webhooks/voice/incoming", post(incoming))
        .route(
            "/webhooks/voice/transcription-available",
            post(transcription_available),
        )
        .route("/webhooks/voice/va-incoming", post(va_incoming))
        .route(
            "/webhooks/voice/va-transcription-available",
            post(va_transcription_available),
        )
        .route("/webhooks/voice/va-recording-post", post(va_recording_post))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failure_is_a_server_error() {
        let result = respond(
            &VoiceSettings::default(),
            Err(DomainError::Repository("pool timed out".into())),
        );
        let (status, body) = result.unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("pool timed out"));
    }

    #[test]
    fn test_other_failures_end_the_call_politely() {
        let twiml = respond(
            &VoiceSettings::default(),
            Err(DomainError::ExternalService("directory offline".into())),
        )
        .unwrap();
        assert!(twiml.as_str().contains("An error occurred. Goodbye."));
        assert!(twiml.as_str().ends_with("<Hangup/></Response>"));
    }
}
