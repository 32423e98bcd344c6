use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod adapters;
mod application;
mod auth;
mod config;
mod models;
mod routes;
mod services;

use tradeline::{
    AgentSessionStore, BusinessDirectory, CallRecordStore, EnquiryPublisher, LlmProvider,
};

use adapters::{
    GeminiProvider, HttpEnquiryPublisher, InMemoryAgentSessionStore, InMemoryBusinessDirectory,
    InMemoryCallStore, PgAgentSessionStore, PgBusinessDirectory, PgCallStore,
};
use application::{CallService, ConversationDriver, DriverSettings};
use config::{AppConfig, StoreBackend, VoiceSettings};
use services::{
    assistant::LlmConversationAgent, extractor::LlmTranscriptExtractor, UnconfiguredLlm,
};

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub driver: Arc<ConversationDriver>,
    pub calls: Arc<CallService>,
    pub voice: VoiceSettings,
}

#[derive(Serialize)]
struct HealthCheck {
    status: String,
    message: String,
    version: String,
}

async fn health_check() -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "ok".to_string(),
        message: "Tradeline API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build the full router around a prepared state
pub fn build_router(state: AppState) -> Router {
    // Debug views (require authentication)
    let protected_routes =
        routes::calls::router().layer(middleware::from_fn(auth::auth_middleware));

    // OpenAPI documentation
    let openapi = routes::swagger::ApiDoc::openapi();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .route("/health", get(health_check))
        .merge(routes::voice::router())
        .merge(protected_routes)
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[shuttle_runtime::main]
async fn main(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secrets: shuttle_runtime::SecretStore,
) -> shuttle_axum::ShuttleAxum {
    tracing::info!("📞 Tradeline API initializing...");

    let config = AppConfig::from_secrets(&secrets);

    // Initialize API key from secrets
    if let Some(api_key) = &config.api_key {
        auth::init_api_key(api_key.clone());
        tracing::info!("🔐 API key authentication enabled for debug routes");
    } else {
        tracing::warn!("⚠️  No TRADELINE_API_KEY set - authentication disabled");
    }

    // Run migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run database migrations: {e}"))?;

    tracing::info!("✅ Database migrations completed");

    let (store, directory, sessions): (
        Arc<dyn CallRecordStore>,
        Arc<dyn BusinessDirectory>,
        Arc<dyn AgentSessionStore>,
    ) = match config.store {
        StoreBackend::Postgres => {
            let directory = PgBusinessDirectory::new(pool.clone());
            directory
                .seed(&config.default_business)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to seed business directory: {e}"))?;
            tracing::info!("🐘 Call records stored in Postgres");
            (
                Arc::new(PgCallStore::new(pool.clone())),
                Arc::new(directory),
                Arc::new(PgAgentSessionStore::new(pool)),
            )
        }
        StoreBackend::Memory => {
            tracing::warn!("⚠️  CALL_STORE=memory - call records are lost on restart");
            (
                Arc::new(InMemoryCallStore::new()),
                Arc::new(InMemoryBusinessDirectory::new(vec![
                    config.default_business.clone(),
                ])),
                Arc::new(InMemoryAgentSessionStore::new()),
            )
        }
    };

    // Initialize the LLM provider if configured
    let llm: Arc<dyn LlmProvider> = match &config.gemini_api_key {
        Some(key) => {
            let provider = GeminiProvider::new(key.clone()).with_model(&config.gemini_model);
            tracing::info!("🤖 Gemini provider initialized ({})", provider.model_id());
            Arc::new(provider)
        }
        None => {
            tracing::warn!("⚠️  No GEMINI_API_KEY set - assistant and polished view disabled");
            Arc::new(UnconfiguredLlm)
        }
    };

    if config.enquiries.url.is_none() {
        tracing::warn!("⚠️  No ENQUIRIES_API_URL set - enquiries will not be published");
    }
    let publisher: Arc<dyn EnquiryPublisher> =
        Arc::new(HttpEnquiryPublisher::new(config.enquiries.clone()));

    let agent = Arc::new(LlmConversationAgent::new(llm.clone(), sessions));
    let extractor = Arc::new(LlmTranscriptExtractor::new(llm));

    let driver = Arc::new(ConversationDriver::new(
        store.clone(),
        directory,
        agent,
        publisher,
        DriverSettings::from_config(&config),
    ));
    let calls = Arc::new(CallService::new(store, extractor));

    let state = AppState {
        driver,
        calls,
        voice: config.voice.clone(),
    };

    let router = build_router(state);

    tracing::info!("📚 Swagger UI: /swagger-ui");
    tracing::info!("✅ Tradeline API ready - answering on {}", config.voice_url("incoming"));

    Ok(router.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use std::time::Duration;
    use tower::ServiceExt;
    use tradeline::{
        AgentInput, AgentTurn, BusinessProfile, CallContext, CallRecord, ConversationAgent,
        DomainError, EnquiryPayload, EnquirySummary, RecordUpdate, TranscriptExtractor,
    };

    struct SilentAgent;

    #[async_trait]
    impl ConversationAgent for SilentAgent {
        async fn next_turn(
            &self,
            _call: &CallContext,
            _input: AgentInput,
        ) -> Result<AgentTurn, DomainError> {
            Ok(AgentTurn::reply("How can I help?"))
        }
    }

    struct NoopPublisher;

    #[async_trait]
    impl EnquiryPublisher for NoopPublisher {
        async fn publish(&self, _payload: &EnquiryPayload) -> Result<(), DomainError> {
            Ok(())
        }
    }

    struct FailingExtractor;

    #[async_trait]
    impl TranscriptExtractor for FailingExtractor {
        async fn extract(&self, _sources: [&str; 3]) -> Result<EnquirySummary, DomainError> {
            Err(DomainError::ExternalService("offline".into()))
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl CallRecordStore for BrokenStore {
        async fn upsert(
            &self,
            _session_id: &str,
            _update: RecordUpdate,
        ) -> Result<CallRecord, DomainError> {
            Err(DomainError::Repository("connection reset".into()))
        }

        async fn get(&self, _session_id: &str) -> Result<Option<CallRecord>, DomainError> {
            Err(DomainError::Repository("connection reset".into()))
        }

        async fn list(&self) -> Result<Vec<CallRecord>, DomainError> {
            Err(DomainError::Repository("connection reset".into()))
        }
    }

    fn state_with(store: Arc<dyn CallRecordStore>) -> AppState {
        let directory = Arc::new(InMemoryBusinessDirectory::new(vec![BusinessProfile::new(
            "TRADIE_101",
            "Tom's Plumbing",
            "+61400555666",
            "+61499888777",
        )]));
        let driver = ConversationDriver::new(
            store.clone(),
            directory,
            Arc::new(SilentAgent),
            Arc::new(NoopPublisher),
            DriverSettings {
                base_url: "https://calls.test".to_string(),
                transcript_separator: " \n ".to_string(),
                publish_timeout: Duration::from_secs(1),
            },
        );
        AppState {
            driver: Arc::new(driver),
            calls: Arc::new(CallService::new(store, Arc::new(FailingExtractor))),
            voice: VoiceSettings::default(),
        }
    }

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_unmatched_route_is_404_without_side_effects() {
        let store = Arc::new(InMemoryCallStore::new());
        let app = build_router(state_with(store.clone()));

        let response = app
            .oneshot(form_post("/webhooks/voice/nope", "CallSid=CA1&From=%2B614"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["error"], "Route not found");
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_incoming_renders_twiml() {
        let store = Arc::new(InMemoryCallStore::new());
        let app = build_router(state_with(store.clone()));

        let response = app
            .oneshot(form_post(
                "/webhooks/voice/incoming",
                "CallSid=CA1&From=%2B61411111111&To=%2B61400555666",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/xml"
        );
        let xml = body_string(response).await;
        assert!(xml.contains("transcription-available?step=job-details"));
        assert!(xml.contains("Tom&apos;s Plumbing"));
        assert!(store.get("CA1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_step_query_is_routed_to_capture() {
        let store = Arc::new(InMemoryCallStore::new());
        let app = build_router(state_with(store.clone()));

        let response = app
            .oneshot(form_post(
                "/webhooks/voice/transcription-available?step=job-details",
                "CallSid=CA1&SpeechResult=fix+my+switchboard",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("step=address-details"));
        let record = store.get("CA1").await.unwrap().unwrap();
        assert_eq!(record.steps[0].text, "fix my switchboard");
    }

    #[tokio::test]
    async fn test_json_callback_body_is_accepted() {
        let store = Arc::new(InMemoryCallStore::new());
        let app = build_router(state_with(store.clone()));

        let request = Request::builder()
            .method("POST")
            .uri("/webhooks/voice/va-recording-post")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"CallSid":"CA4","RecordingUrl":"https://rec/4","RecordingStatus":"completed"}"#,
            ))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let record = store.get("CA4").await.unwrap().unwrap();
        assert_eq!(record.recording_status.as_deref(), Some("completed"));
    }

    #[tokio::test]
    async fn test_store_failure_is_500() {
        let app = build_router(state_with(Arc::new(BrokenStore)));

        let response = app
            .oneshot(form_post(
                "/webhooks/voice/transcription-available?step=job-details",
                "CallSid=CA1&SpeechResult=hello",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_polished_view_with_no_calls() {
        let app = build_router(state_with(Arc::new(InMemoryCallStore::new())));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/webhooks/voice/all-calls/polished")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body, serde_json::json!({"error": "No calls found"}));
    }

    #[tokio::test]
    async fn test_all_calls_lists_records() {
        let store = Arc::new(InMemoryCallStore::new());
        store
            .upsert(
                "CA1",
                RecordUpdate::new().addresses("+61411111111", "+61400555666"),
            )
            .await
            .unwrap();
        let app = build_router(state_with(store));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/webhooks/voice/all-calls")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body[0]["callSid"], "CA1");
        assert_eq!(body[0]["status"], "RECEIVED");
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(state_with(Arc::new(InMemoryCallStore::new())));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
