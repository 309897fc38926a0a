//! HTTP front end: health check and a JSON chat endpoint.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::companion::{Companion, TurnOutput, UserInput};
use crate::error::{ChannelError, Error};
use crate::graph::WorkflowKind;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub companion: Arc<Companion>,
}

/// Build the Axum router with the health and chat routes.
pub fn chat_routes(companion: Arc<Companion>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .with_state(AppState { companion })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub thread_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub audio_base64: Option<String>,
    #[serde(default)]
    pub image_base64: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub workflow: WorkflowKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_base64: Option<String>,
}

impl From<TurnOutput> for ChatResponse {
    fn from(out: TurnOutput) -> Self {
        Self {
            reply: out.reply,
            workflow: out.workflow,
            image_base64: out.image.map(|bytes| STANDARD.encode(bytes)),
            audio_base64: out.audio.map(|bytes| STANDARD.encode(bytes)),
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "ava-companion"
    }))
}

fn error_response(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(serde_json::json!({ "error": message.into() })))
}

fn decode_field(
    name: &str,
    value: Option<String>,
) -> Result<Option<Vec<u8>>, (StatusCode, Json<serde_json::Value>)> {
    value
        .map(|encoded| STANDARD.decode(encoded.trim()))
        .transpose()
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, format!("Invalid {name}: {e}")))
}

async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<serde_json::Value>)> {
    if body.thread_id.trim().is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "thread_id is required"));
    }

    let input = UserInput {
        text: body.message,
        audio: decode_field("audio_base64", body.audio_base64)?,
        image: decode_field("image_base64", body.image_base64)?,
    };
    if input.is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "message is empty"));
    }

    match state.companion.handle_turn(&body.thread_id, input).await {
        Ok(out) => {
            info!(thread_id = %body.thread_id, workflow = %out.workflow, "Chat turn served");
            Ok(Json(out.into()))
        }
        Err(Error::Channel(ChannelError::InvalidMessage(reason))) => {
            Err(error_response(StatusCode::BAD_REQUEST, reason))
        }
        Err(e) if e.is_config() => {
            warn!(error = %e, "Chat turn misconfigured");
            Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
        Err(e) => {
            warn!(error = %e, "Chat turn failed");
            Err(error_response(StatusCode::BAD_GATEWAY, e.to_string()))
        }
    }
}
