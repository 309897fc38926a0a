//! Integration tests for the chat HTTP API.
//!
//! Each test spins up an Axum server on a random port backed by scripted
//! backends and exercises the real JSON contract with reqwest.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::time::timeout;

use ava_companion::channels::chat_routes;
use ava_companion::companion::{Companion, UserInput};
use ava_companion::config::Settings;
use ava_companion::error::{ConfigError, LlmError, MediaError};
use ava_companion::graph::helpers::BackendFactory;
use ava_companion::graph::{RunContext, WorkflowKind, workflow_graph};
use ava_companion::llm::{ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, Role};
use ava_companion::media::{ImageToText, ScenarioPrompt, SpeechToText, TextToImage, TextToSpeech};
use ava_companion::memory::MemoryManager;
use ava_companion::store::{Checkpointer, LibSqlBackend, MemoryStore};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Routes on keywords in the latest user message; replies with a fixed line.
struct ScriptedLlm;

fn last_user_text(request: &CompletionRequest) -> String {
    request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.to_lowercase())
        .unwrap_or_default()
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    fn model_name(&self) -> &str {
        "scripted"
    }

    fn temperature(&self) -> f32 {
        0.7
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let text = last_user_text(&request);
        let content = match request.output_schema.as_ref().map(|s| s.name.as_str()) {
            Some("RouterResponse") => {
                let route = if text.contains("picture") {
                    "image"
                } else if text.contains("voice") {
                    "audio"
                } else {
                    "conversation"
                };
                serde_json::json!({ "response_type": route }).to_string()
            }
            Some("MemoryAnalysis") => {
                if text.contains("my name is sam") {
                    r#"{"is_important": true, "formatted_memory": "Name is Sam"}"#.to_string()
                } else {
                    r#"{"is_important": false, "formatted_memory": null}"#.to_string()
                }
            }
            _ => "*smiles* hey, I'm Ava".to_string(),
        };

        Ok(CompletionResponse::new(content))
    }
}

struct StubMedia;

#[async_trait]
impl TextToSpeech for StubMedia {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, MediaError> {
        Ok(text.as_bytes().to_vec())
    }
}

#[async_trait]
impl SpeechToText for StubMedia {
    async fn transcribe(&self, _audio: &[u8]) -> Result<String, MediaError> {
        Ok("send me a voice note".to_string())
    }
}

#[async_trait]
impl TextToImage for StubMedia {
    async fn create_scenario(&self, _history: &[ChatMessage]) -> Result<ScenarioPrompt, MediaError> {
        Ok(ScenarioPrompt {
            narrative: "Painting at the beach".into(),
            image_prompt: "beach at dusk".into(),
        })
    }

    async fn generate_image(&self, _prompt: &str, output_path: &Path) -> Result<Vec<u8>, MediaError> {
        tokio::fs::create_dir_all(output_path.parent().unwrap()).await?;
        tokio::fs::write(output_path, b"\x89PNG").await?;
        Ok(b"\x89PNG".to_vec())
    }
}

#[async_trait]
impl ImageToText for StubMedia {
    async fn analyze_image(&self, _image: &[u8], _prompt: &str) -> Result<String, MediaError> {
        Ok("a drawing of a robot".to_string())
    }
}

struct ScriptedBackends;

impl BackendFactory for ScriptedBackends {
    fn chat_model(&self, _temperature: f32) -> Result<Arc<dyn LlmProvider>, LlmError> {
        Ok(Arc::new(ScriptedLlm))
    }
    fn small_chat_model(&self) -> Result<Arc<dyn LlmProvider>, LlmError> {
        Ok(Arc::new(ScriptedLlm))
    }
    fn text_to_speech(&self) -> Result<Arc<dyn TextToSpeech>, ConfigError> {
        Ok(Arc::new(StubMedia))
    }
    fn speech_to_text(&self) -> Result<Arc<dyn SpeechToText>, ConfigError> {
        Ok(Arc::new(StubMedia))
    }
    fn text_to_image(&self) -> Result<Arc<dyn TextToImage>, MediaError> {
        Ok(Arc::new(StubMedia))
    }
    fn image_to_text(&self) -> Result<Arc<dyn ImageToText>, ConfigError> {
        Ok(Arc::new(StubMedia))
    }
}

async fn companion(db: Arc<LibSqlBackend>, image_dir: &Path) -> Arc<Companion> {
    let mut settings = Settings::new("gsk_test");
    settings.image_dir = image_dir.to_path_buf();
    let settings = Arc::new(settings);
    let memory = Arc::new(MemoryManager::new(db.clone(), settings.memory_top_k));
    let ctx = RunContext::new(settings, Arc::new(ScriptedBackends), memory);
    Arc::new(Companion::new(workflow_graph().unwrap(), ctx, db))
}

/// Start an Axum server on a random port, return (base url, db).
async fn start_server(image_dir: &Path) -> (String, Arc<LibSqlBackend>) {
    let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let app = chat_routes(companion(db.clone(), image_dir).await);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}"), db)
}

async fn post_chat(base: &str, body: Value) -> (reqwest::StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(format!("{base}/api/chat"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn health_endpoint() {
    timeout(TEST_TIMEOUT, async {
        let dir = tempfile::tempdir().unwrap();
        let (base, _db) = start_server(dir.path()).await;

        let json: Value = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(json["status"], "ok");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn text_turn_round_trip() {
    timeout(TEST_TIMEOUT, async {
        let dir = tempfile::tempdir().unwrap();
        let (base, db) = start_server(dir.path()).await;

        let (status, json) =
            post_chat(&base, serde_json::json!({"thread_id": "t", "message": "hey there"})).await;
        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(json["reply"], "hey, I'm Ava");
        assert_eq!(json["workflow"], "conversation");

        let saved = db.load("t").await.unwrap().unwrap();
        assert_eq!(saved.messages.len(), 2);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn picture_request_returns_image() {
    timeout(TEST_TIMEOUT, async {
        let dir = tempfile::tempdir().unwrap();
        let (base, _db) = start_server(dir.path()).await;

        let (status, json) = post_chat(
            &base,
            serde_json::json!({"thread_id": "p", "message": "send me a picture of your day"}),
        )
        .await;
        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(json["workflow"], "image");
        let image = STANDARD.decode(json["image_base64"].as_str().unwrap()).unwrap();
        assert_eq!(image, b"\x89PNG");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn voice_message_in_voice_reply_out() {
    timeout(TEST_TIMEOUT, async {
        let dir = tempfile::tempdir().unwrap();
        let (base, _db) = start_server(dir.path()).await;

        let (status, json) = post_chat(
            &base,
            serde_json::json!({"thread_id": "v", "audio_base64": STANDARD.encode(b"ID3...")}),
        )
        .await;
        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(json["workflow"], "audio");
        let audio = STANDARD.decode(json["audio_base64"].as_str().unwrap()).unwrap();
        assert_eq!(audio, json["reply"].as_str().unwrap().as_bytes());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn invalid_requests_are_rejected() {
    timeout(TEST_TIMEOUT, async {
        let dir = tempfile::tempdir().unwrap();
        let (base, _db) = start_server(dir.path()).await;

        let (status, _) =
            post_chat(&base, serde_json::json!({"thread_id": "x", "message": "  "})).await;
        assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);

        let (status, _) =
            post_chat(&base, serde_json::json!({"thread_id": "", "message": "hi"})).await;
        assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);

        let (status, json) = post_chat(
            &base,
            serde_json::json!({"thread_id": "x", "audio_base64": "not base64!"}),
        )
        .await;
        assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("audio_base64"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn conversation_and_memories_survive_restart() {
    timeout(TEST_TIMEOUT, async {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("ava.db");

        {
            let db = Arc::new(LibSqlBackend::new_local(&db_path).await.unwrap());
            let companion = companion(db, dir.path()).await;
            companion
                .handle_turn("cli", UserInput::text("hi, my name is Sam"))
                .await
                .unwrap();
        }

        let db = Arc::new(LibSqlBackend::new_local(&db_path).await.unwrap());
        let memories = db.list_memories().await.unwrap();
        assert_eq!(memories.len(), 1);
        assert_eq!(memories[0].text, "Name is Sam");

        let companion = companion(db.clone(), dir.path()).await;
        let out = companion
            .handle_turn("cli", UserInput::text("what's my name?"))
            .await
            .unwrap();
        assert_eq!(out.workflow, WorkflowKind::Conversation);

        let saved = db.load("cli").await.unwrap().unwrap();
        assert_eq!(saved.messages.len(), 4);
        assert_eq!(saved.memory_context, "- Name is Sam");
    })
    .await
    .expect("test timed out");
}
