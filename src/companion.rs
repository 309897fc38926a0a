//! Turn handling: checkpoint load, input conversion, graph run, checkpoint save.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::error::{ChannelError, Error, MediaError, Result};
use crate::graph::{CompanionState, CompiledGraph, RunContext, WorkflowKind};
use crate::llm::{ChatMessage, Role};
use crate::store::Checkpointer;

/// Prompt used when the user attaches a picture.
pub const IMAGE_ANALYSIS_PROMPT: &str =
    "Please describe what you see in this image in the context of our conversation.";

/// One inbound user turn. At least one part must be present.
#[derive(Debug, Clone, Default)]
pub struct UserInput {
    pub text: String,
    /// Voice message; transcribed and used instead of `text`.
    pub audio: Option<Vec<u8>>,
    pub image: Option<Vec<u8>>,
}

impl UserInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
            && self.audio.as_ref().is_none_or(|a| a.is_empty())
            && self.image.as_ref().is_none_or(|i| i.is_empty())
    }
}

/// Ava's answer to one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutput {
    pub reply: String,
    pub workflow: WorkflowKind,
    pub image: Option<Vec<u8>>,
    pub audio: Option<Vec<u8>>,
}

type ThreadLocks = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

pub struct Companion {
    graph: Arc<CompiledGraph>,
    ctx: RunContext,
    checkpointer: Arc<dyn Checkpointer>,
    /// Turn locks for threads with a turn running or waiting.
    threads: ThreadLocks,
}

/// A claim on one thread's turn lock.
///
/// Dropping the last claim removes the lock from the map.
struct ThreadSlot<'a> {
    threads: &'a ThreadLocks,
    thread_id: String,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl<'a> ThreadSlot<'a> {
    fn claim(threads: &'a ThreadLocks, thread_id: &str) -> Self {
        let mut map = threads.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let lock = Arc::clone(map.entry(thread_id.to_string()).or_default());
        Self {
            threads,
            thread_id: thread_id.to_string(),
            lock,
        }
    }
}

impl Drop for ThreadSlot<'_> {
    fn drop(&mut self) {
        let mut map = self
            .threads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // One reference in the map, one here: no other turn holds or waits.
        if Arc::strong_count(&self.lock) == 2 {
            map.remove(&self.thread_id);
        }
    }
}

impl Companion {
    pub fn new(graph: Arc<CompiledGraph>, ctx: RunContext, checkpointer: Arc<dyn Checkpointer>) -> Self {
        Self {
            graph,
            ctx,
            checkpointer,
            threads: Mutex::new(HashMap::new()),
        }
    }

    /// Run one turn on `thread_id`. Turns on the same thread are serialized.
    pub async fn handle_turn(&self, thread_id: &str, input: UserInput) -> Result<TurnOutput> {
        if input.is_empty() {
            return Err(ChannelError::InvalidMessage("empty message".to_string()).into());
        }

        let slot = ThreadSlot::claim(&self.threads, thread_id);
        let _guard = slot.lock.lock().await;

        let content = self.user_message(input).await?;
        let mut state: CompanionState = self
            .checkpointer
            .load(thread_id)
            .await?
            .unwrap_or_default();
        state.begin_turn();
        state.push(ChatMessage::user(content));

        let trace = self.graph.invoke(&mut state, &self.ctx).await?;
        debug!(thread_id, nodes = ?trace.visited, "Graph run finished");

        let reply = state
            .last_message()
            .filter(|m| m.role == Role::Assistant)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let image = match &state.image_path {
            Some(path) => Some(tokio::fs::read(path).await.map_err(MediaError::Io)?),
            None => None,
        };

        self.checkpointer.save(thread_id, &state).await?;
        info!(thread_id, workflow = %state.workflow, "Turn complete");

        Ok(TurnOutput {
            reply,
            workflow: state.workflow,
            image,
            audio: state.audio_buffer.take(),
        })
    }

    /// Flatten the input into the text of one user message.
    async fn user_message(&self, input: UserInput) -> Result<String> {
        let mut content = input.text.trim().to_string();

        if let Some(audio) = input.audio.filter(|a| !a.is_empty()) {
            let stt = self.ctx.backends.speech_to_text()?;
            content = stt.transcribe(&audio).await?;
            debug!(chars = content.len(), "Voice message transcribed");
        }

        if let Some(image) = input.image.filter(|i| !i.is_empty()) {
            let vision = self.ctx.backends.image_to_text()?;
            let description = vision.analyze_image(&image, IMAGE_ANALYSIS_PROMPT).await?;
            content = format!("{content}\n[Image Analysis: {description}]")
                .trim()
                .to_string();
        }

        if content.is_empty() {
            return Err(Error::Channel(ChannelError::InvalidMessage(
                "message has no content".to_string(),
            )));
        }
        Ok(content)
    }
}
