//! Integration tests for the concierge API.
//!
//! Each test builds its own router over an in-memory database (or none),
//! stub LLM providers, and a stub transcriber.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use concierge_api::create_router;
use concierge_api::handlers::HealthResponse;
use concierge_api::state::AppState;
use concierge_chat::EMPTY_INPUT_REPLY;
use concierge_core::config::ConciergeConfig;
use concierge_llm::{GenerateRequest, LlmProvider, ProviderError, ProviderRegistry, SpeechToText};
use concierge_storage::{Database, InteractionRepository, StoreHandle};

// =============================================================================
// Helpers
// =============================================================================

struct StubProvider {
    name: &'static str,
    reply: Option<&'static str>,
}

#[async_trait]
impl LlmProvider for StubProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn generate(&self, _request: &GenerateRequest) -> Result<String, ProviderError> {
        self.reply
            .map(str::to_string)
            .ok_or_else(|| ProviderError::Upstream {
                status: 503,
                body: "overloaded".to_string(),
            })
    }
}

struct StubStt(Option<&'static str>);

#[async_trait]
impl SpeechToText for StubStt {
    async fn transcribe(&self, _audio: Vec<u8>, _filename: &str) -> Result<String, ProviderError> {
        self.0
            .map(str::to_string)
            .ok_or_else(|| ProviderError::Upstream {
                status: 400,
                body: "could not decode audio".to_string(),
            })
    }
}

fn providers(replies: &[(&'static str, Option<&'static str>)]) -> ProviderRegistry {
    replies
        .iter()
        .fold(ProviderRegistry::new(), |reg, &(name, reply)| {
            reg.with_provider(Arc::new(StubProvider { name, reply }))
        })
}

fn make_state(
    store: StoreHandle,
    registry: ProviderRegistry,
    transcript: Option<&'static str>,
) -> AppState {
    AppState::new(
        ConciergeConfig::default(),
        store,
        registry,
        Arc::new(StubStt(transcript)),
    )
}

fn live_store() -> StoreHandle {
    StoreHandle::from_database(Database::in_memory().unwrap())
}

fn make_app() -> axum::Router {
    create_router(make_state(
        live_store(),
        providers(&[("groq", Some("The pool opens at 7 AM."))]),
        Some("Is there a pool?"),
    ))
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

const BOUNDARY: &str = "concierge-test-boundary";

fn post_multipart(uri: &str, field: &str, filename: &str, data: &[u8]) -> Request<Body> {
    let part = format!(
        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: audio/webm\r\n\r\n",
        field, filename
    );
    multipart_request(uri, &part, data)
}

fn post_form_value(uri: &str, field: &str, value: &str) -> Request<Body> {
    let part = format!(
        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
        field
    );
    multipart_request(uri, &part, value.as_bytes())
}

fn multipart_request(uri: &str, part_headers: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(part_headers.as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::post(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// POST /api/text
// =============================================================================

#[tokio::test]
async fn test_text_faq_reply() {
    let store = live_store();
    let app = create_router(make_state(
        store.clone(),
        providers(&[("groq", Some("should not be used"))]),
        None,
    ));

    let resp = app
        .oneshot(post_json(
            "/api/text",
            r#"{"transcript":"What time is check-in?","conversationId":"conv-42"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["transcript"], "What time is check-in?");
    assert!(json["reply"].as_str().unwrap().contains("3:00 PM"));
    assert_eq!(json["conversationId"], "conv-42");

    let repo = InteractionRepository::new(store.database().unwrap().clone());
    assert_eq!(repo.count_for("conv-42").unwrap(), 2);
}

#[tokio::test]
async fn test_text_llm_reply_mints_conversation_id() {
    let app = make_app();
    let resp = app
        .oneshot(post_json("/api/text", r#"{"transcript":"Is there a pool?"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["reply"], "The pool opens at 7 AM.");
    assert!(!json["conversationId"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_text_empty_transcript() {
    let store = live_store();
    let app = create_router(make_state(store.clone(), providers(&[]), None));

    let resp = app
        .oneshot(post_json("/api/text", r#"{"transcript":"   "}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["reply"], EMPTY_INPUT_REPLY);
    assert_eq!(json["transcript"], "");
    assert!(!json["conversationId"].as_str().unwrap().is_empty());

    let repo = InteractionRepository::new(store.database().unwrap().clone());
    assert_eq!(repo.count().unwrap(), 0);
}

#[tokio::test]
async fn test_text_missing_fields_treated_as_empty() {
    let app = make_app();
    let resp = app.oneshot(post_json("/api/text", "{}")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["reply"], EMPTY_INPUT_REPLY);
}

#[tokio::test]
async fn test_text_secondary_provider() {
    let app = create_router(make_state(
        live_store(),
        providers(&[("groq", None), ("gemini", Some("Gemini says hi."))]),
        None,
    ));
    let resp = app
        .oneshot(post_json("/api/text", r#"{"transcript":"Hello there"}"#))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["reply"], "Gemini says hi.");
}

#[tokio::test]
async fn test_text_fallback_without_database_or_providers() {
    let app = create_router(make_state(
        StoreHandle::disabled(),
        providers(&[("groq", None), ("gemini", None)]),
        None,
    ));
    let resp = app
        .oneshot(post_json(
            "/api/text",
            r#"{"transcript":"Do you allow pets?","conversationId":"c1"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    let reply = json["reply"].as_str().unwrap();
    assert!(reply.starts_with("I heard: \"Do you allow pets?\""));
    assert_eq!(json["conversationId"], "c1");
}

#[tokio::test]
async fn test_text_malformed_json_is_bad_request() {
    let app = make_app();
    let resp = app
        .oneshot(post_json("/api/text", "{not json"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(resp).await["error"].is_string());
}

// =============================================================================
// POST /api/voice
// =============================================================================

#[tokio::test]
async fn test_voice_happy_path() {
    let app = make_app();
    let resp = app
        .oneshot(post_multipart("/api/voice", "audio", "clip.webm", b"RIFFfake"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["transcript"], "Is there a pool?");
    assert_eq!(json["reply"], "The pool opens at 7 AM.");
}

#[tokio::test]
async fn test_voice_missing_audio_field() {
    let app = make_app();
    let resp = app
        .oneshot(post_multipart("/api/voice", "file", "clip.webm", b"data"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "No audio uploaded");
}

#[tokio::test]
async fn test_voice_plain_form_value_is_not_an_upload() {
    let app = make_app();
    let resp = app
        .oneshot(post_form_value("/api/voice", "audio", "not a file"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "No audio uploaded");
}

#[tokio::test]
async fn test_voice_not_multipart() {
    let app = make_app();
    let resp = app
        .oneshot(post_json("/api/voice", r#"{"audio":"nope"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "No audio uploaded");
}

#[tokio::test]
async fn test_voice_transcription_failure_is_500() {
    let app = create_router(make_state(
        live_store(),
        providers(&[("groq", Some("unused"))]),
        None,
    ));
    let resp = app
        .oneshot(post_multipart("/api/voice", "audio", "clip.wav", b"garbage"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(resp).await;
    assert!(json["error"].as_str().unwrap().contains("transcription failed"));
}

#[tokio::test]
async fn test_voice_llm_failure_is_500() {
    let app = create_router(make_state(
        live_store(),
        providers(&[("groq", None)]),
        Some("Is there a pool?"),
    ));
    let resp = app
        .oneshot(post_multipart("/api/voice", "audio", "clip.wav", b"audio"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// =============================================================================
// GET /health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let mut registry = ProviderRegistry::new();
    registry.register("groq", None);
    registry.register(
        "gemini",
        Some(Arc::new(StubProvider {
            name: "gemini",
            reply: Some("hi"),
        }) as Arc<dyn LlmProvider>),
    );
    let app = create_router(make_state(live_store(), registry, None));

    let resp = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health.status, "ok");
    assert!(health.persistence);
    assert_eq!(health.providers.len(), 2);
    assert!(!health.providers[0].enabled);
    assert_eq!(health.providers[1].name, "gemini");
    assert!(health.providers[1].enabled);
}

#[tokio::test]
async fn test_health_without_database() {
    let app = create_router(make_state(StoreHandle::disabled(), providers(&[]), None));
    let resp = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["persistence"], false);
}

// =============================================================================
// CORS
// =============================================================================

#[tokio::test]
async fn test_allowed_origin_gets_cors_header() {
    let app = make_app();
    let req = Request::get("/health")
        .header("origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:3000"
    );
}

#[tokio::test]
async fn test_disallowed_origin_is_rejected() {
    let app = make_app();
    let req = Request::post("/api/text")
        .header("origin", "https://evil.example.com")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"transcript":"hi"}"#))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(resp.headers().get("access-control-allow-origin").is_none());
    let json = body_json(resp).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("https://evil.example.com"));
}

#[tokio::test]
async fn test_frontend_url_extends_allow_list() {
    let mut config = ConciergeConfig::default();
    config.apply_env_from(|key| match key {
        "FRONTEND_URL" => Some("https://hotel.example.com/".to_string()),
        _ => None,
    });
    let state = AppState::new(
        config,
        StoreHandle::disabled(),
        providers(&[]),
        Arc::new(StubStt(None)),
    );
    let app = create_router(state);

    let req = Request::get("/health")
        .header("origin", "https://hotel.example.com")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
