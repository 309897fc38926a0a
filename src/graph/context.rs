//! Shared services handed to every node of a run.

use std::sync::Arc;

use crate::config::Settings;
use crate::graph::helpers::BackendFactory;
use crate::memory::MemoryManager;
use crate::schedule::ScheduleContextGenerator;

/// Read-only services for one run. Cheap to clone.
#[derive(Clone)]
pub struct RunContext {
    pub settings: Arc<Settings>,
    pub backends: Arc<dyn BackendFactory>,
    pub memory: Arc<MemoryManager>,
    pub schedule: ScheduleContextGenerator,
}

impl RunContext {
    pub fn new(
        settings: Arc<Settings>,
        backends: Arc<dyn BackendFactory>,
        memory: Arc<MemoryManager>,
    ) -> Self {
        Self {
            settings,
            backends,
            memory,
            schedule: ScheduleContextGenerator::new(),
        }
    }

    pub fn with_schedule(mut self, schedule: ScheduleContextGenerator) -> Self {
        self.schedule = schedule;
        self
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Stub backends for exercising nodes without network access.

    use std::path::Path;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;
    use crate::error::{ConfigError, DatabaseError, LlmError, MediaError};
    use crate::llm::{ChatMessage, CompletionRequest, CompletionResponse, LlmProvider};
    use crate::media::{ImageToText, ScenarioPrompt, SpeechToText, TextToImage, TextToSpeech};
    use crate::store::{MemoryStore, StoredMemory};

    /// Chat model that answers by schema name and records every request.
    #[derive(Clone)]
    pub(crate) struct StubLlm {
        route: String,
        memory: Option<String>,
        reply: String,
        fail: bool,
        requests: Arc<Mutex<Vec<CompletionRequest>>>,
    }

    impl StubLlm {
        pub(crate) fn new() -> Self {
            Self {
                route: "conversation".to_string(),
                memory: None,
                reply: "hey there".to_string(),
                fail: false,
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub(crate) fn with_route(mut self, route: &str) -> Self {
            self.route = route.to_string();
            self
        }

        pub(crate) fn with_memory(mut self, memory: Option<&str>) -> Self {
            self.memory = memory.map(str::to_string);
            self
        }

        pub(crate) fn with_reply(mut self, reply: &str) -> Self {
            self.reply = reply.to_string();
            self
        }

        pub(crate) fn failing(mut self) -> Self {
            self.fail = true;
            self
        }

        pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }

        /// Requests carrying the named output schema.
        pub(crate) fn requests_for(&self, schema: &str) -> Vec<CompletionRequest> {
            self.requests()
                .into_iter()
                .filter(|r| r.output_schema.as_ref().map(|s| s.name.as_str()) == Some(schema))
                .collect()
        }

        /// Plain (unstructured) requests.
        pub(crate) fn plain_requests(&self) -> Vec<CompletionRequest> {
            self.requests()
                .into_iter()
                .filter(|r| r.output_schema.is_none())
                .collect()
        }
    }

    #[async_trait]
    impl LlmProvider for StubLlm {
        fn model_name(&self) -> &str {
            "stub"
        }

        fn temperature(&self) -> f32 {
            0.7
        }

        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(LlmError::RequestFailed {
                    provider: "stub".into(),
                    reason: "scripted failure".into(),
                });
            }

            let content = match request.output_schema.as_ref().map(|s| s.name.as_str()) {
                Some("RouterResponse") => {
                    serde_json::json!({ "response_type": self.route }).to_string()
                }
                Some("MemoryAnalysis") => serde_json::json!({
                    "is_important": self.memory.is_some(),
                    "formatted_memory": self.memory,
                })
                .to_string(),
                Some("ScenarioPrompt") => serde_json::json!({
                    "narrative": "I'm painting by the bay",
                    "image_prompt": "sunset over the bay, oil painting",
                })
                .to_string(),
                _ => self.reply.clone(),
            };

            Ok(CompletionResponse::new(content))
        }
    }

    #[derive(Default)]
    pub(crate) struct StubSpeech;

    #[async_trait]
    impl TextToSpeech for StubSpeech {
        async fn synthesize(&self, text: &str) -> Result<Vec<u8>, MediaError> {
            Ok(format!("audio:{text}").into_bytes())
        }
    }

    #[async_trait]
    impl SpeechToText for StubSpeech {
        async fn transcribe(&self, audio: &[u8]) -> Result<String, MediaError> {
            Ok(String::from_utf8_lossy(audio).into_owned())
        }
    }

    #[derive(Default)]
    pub(crate) struct StubImages;

    #[async_trait]
    impl TextToImage for StubImages {
        async fn create_scenario(&self, _history: &[ChatMessage]) -> Result<ScenarioPrompt, MediaError> {
            Ok(ScenarioPrompt {
                narrative: "I'm painting by the bay".into(),
                image_prompt: "sunset over the bay, oil painting".into(),
            })
        }

        async fn generate_image(&self, _prompt: &str, output_path: &Path) -> Result<Vec<u8>, MediaError> {
            if let Some(parent) = output_path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(output_path, b"png").await?;
            Ok(b"png".to_vec())
        }
    }

    #[async_trait]
    impl ImageToText for StubImages {
        async fn analyze_image(&self, _image: &[u8], _prompt: &str) -> Result<String, MediaError> {
            Ok("a cat on a sofa".into())
        }
    }

    pub(crate) struct StubBackends {
        pub(crate) llm: StubLlm,
    }

    impl BackendFactory for StubBackends {
        fn chat_model(&self, _temperature: f32) -> Result<Arc<dyn LlmProvider>, LlmError> {
            Ok(Arc::new(self.llm.clone()))
        }

        fn small_chat_model(&self) -> Result<Arc<dyn LlmProvider>, LlmError> {
            Ok(Arc::new(self.llm.clone()))
        }

        fn text_to_speech(&self) -> Result<Arc<dyn TextToSpeech>, ConfigError> {
            Ok(Arc::new(StubSpeech))
        }

        fn speech_to_text(&self) -> Result<Arc<dyn SpeechToText>, ConfigError> {
            Ok(Arc::new(StubSpeech))
        }

        fn text_to_image(&self) -> Result<Arc<dyn TextToImage>, MediaError> {
            Ok(Arc::new(StubImages))
        }

        fn image_to_text(&self) -> Result<Arc<dyn ImageToText>, ConfigError> {
            Ok(Arc::new(StubImages))
        }
    }

    /// In-process memory store.
    #[derive(Default)]
    pub(crate) struct VecMemoryStore {
        memories: Mutex<Vec<StoredMemory>>,
    }

    #[async_trait]
    impl MemoryStore for VecMemoryStore {
        async fn insert_memory(&self, memory: &StoredMemory) -> Result<(), DatabaseError> {
            self.memories.lock().unwrap().push(memory.clone());
            Ok(())
        }

        async fn list_memories(&self) -> Result<Vec<StoredMemory>, DatabaseError> {
            Ok(self.memories.lock().unwrap().clone())
        }
    }

    /// Context over stub backends, pinned to a Monday 06:30 schedule slot.
    pub(crate) fn stub_context_with(llm: StubLlm, settings: Settings) -> RunContext {
        let settings = Arc::new(settings);
        let memory = Arc::new(MemoryManager::new(
            Arc::new(VecMemoryStore::default()),
            settings.memory_top_k,
        ));
        let monday = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(6, 30, 0)
            .unwrap();
        RunContext::new(settings, Arc::new(StubBackends { llm }), memory)
            .with_schedule(ScheduleContextGenerator::fixed(monday))
    }

    pub(crate) fn stub_context() -> RunContext {
        stub_context_with(StubLlm::new(), Settings::new("gsk_test"))
    }
}
