//! Route handlers for the concierge API.
//!
//! Each conversation handler runs its turn on a spawned task, so a client
//! that disconnects mid-request does not cancel the turn; the result is
//! simply discarded.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use concierge_chat::{TextReply, VoiceReply};

use crate::error::ApiError;
use crate::state::AppState;

const TEXT_ERROR: &str = "Server error processing text request. Check server logs.";
const NO_AUDIO: &str = "No audio uploaded";
const DEFAULT_AUDIO_FILENAME: &str = "audio.wav";

// =============================================================================
// Text
// =============================================================================

/// Request body for POST /api/text.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRequest {
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// POST /api/text
pub async fn text(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<TextReply>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    info!(
        chars = request.transcript.as_deref().map_or(0, str::len),
        conversation_id = ?request.conversation_id,
        "Received text request"
    );

    let orchestrator = state.orchestrator.clone();
    let turn = tokio::spawn(async move {
        let transcript = request.transcript.unwrap_or_default();
        orchestrator
            .handle(&transcript, request.conversation_id.as_deref())
            .await
    });

    match turn.await {
        Ok(reply) => Ok(Json(reply)),
        Err(e) => {
            error!(error = %e, "Text route unexpected error");
            Err(ApiError::Internal(TEXT_ERROR.to_string()))
        }
    }
}

// =============================================================================
// Voice
// =============================================================================

/// POST /api/voice (multipart, field `audio`)
pub async fn voice(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<VoiceReply>, ApiError> {
    let mut multipart = multipart.map_err(|_| ApiError::BadRequest(NO_AUDIO.to_string()))?;

    let mut upload: Option<(Vec<u8>, String)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        // Only a file part counts as the upload; a plain form value named
        // `audio` is ignored.
        let filename = match (field.name(), field.file_name()) {
            (Some("audio"), Some(name)) if name.trim().is_empty() => {
                DEFAULT_AUDIO_FILENAME.to_string()
            }
            (Some("audio"), Some(name)) => name.to_string(),
            _ => continue,
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        upload = Some((bytes.to_vec(), filename));
        break;
    }

    let (audio, filename) = upload
        .filter(|(audio, _)| !audio.is_empty())
        .ok_or_else(|| ApiError::BadRequest(NO_AUDIO.to_string()))?;
    info!(bytes = audio.len(), filename = %filename, "Received voice upload");

    let intake = state.voice.clone();
    let turn = tokio::spawn(async move { intake.handle(audio, &filename).await });

    match turn.await {
        Ok(Ok(reply)) => Ok(Json(reply)),
        Ok(Err(e)) => {
            error!(error = %e, "Voice route error");
            Err(e.into())
        }
        Err(e) => {
            error!(error = %e, "Voice route unexpected error");
            Err(ApiError::Internal("Server error".to_string()))
        }
    }
}

// =============================================================================
// Health
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub name: String,
    pub enabled: bool,
}

/// Response body for GET /health.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub persistence: bool,
    pub providers: Vec<ProviderStatus>,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let providers = state
        .providers
        .status()
        .into_iter()
        .map(|(name, enabled)| ProviderStatus { name, enabled })
        .collect();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        persistence: state.store.is_available(),
        providers,
    })
}
