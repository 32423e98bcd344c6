//! OpenAPI Documentation
//!
//! Centralized API documentation using utoipa.

use utoipa::OpenApi;

use crate::models::{
    CallRecordResponse, CustomerDetailsResponse, ErrorResponse, PolishedCallResponse,
    StepResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Voice webhooks
        super::voice::ivr_incoming,
        super::voice::ivr_selection,
        super::voice::ivr_recording_completed,
        super::voice::ivr_transcription_completed,
        super::voice::incoming,
        super::voice::transcription_available,
        super::voice::va_incoming,
        super::voice::va_transcription_available,
        super::voice::va_recording_post,
        // Debug views
        super::calls::all_calls,
        super::calls::polished_calls,
    ),
    info(
        title = "Tradeline API",
        version = "0.1.0",
        description = "Call intake for trade businesses: voice webhooks, call records and enquiry summaries.",
        license(name = "MIT"),
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Voice", description = "Telephony provider callbacks, answered with TwiML"),
        (name = "Calls", description = "Debug views over persisted call records"),
    ),
    components(
        schemas(
            StepResponse,
            CallRecordResponse,
            CustomerDetailsResponse,
            PolishedCallResponse,
            ErrorResponse,
        )
    ),
)]
pub struct ApiDoc;
