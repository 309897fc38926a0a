//! Node bodies for the conversation workflow.

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::NodeError;
use crate::graph::chains::{get_character_response_chain, get_router_chain};
use crate::graph::context::RunContext;
use crate::graph::engine::Node;
use crate::graph::helpers::DEFAULT_TEMPERATURE;
use crate::graph::state::CompanionState;
use crate::llm::{ChatMessage, CompletionRequest};
use crate::memory::format_memories_for_prompt;
use crate::prompts::{CREATE_SUMMARY_PROMPT, EXTEND_SUMMARY_PROMPT};

/// Messages joined to form the memory lookup query.
const MEMORY_QUERY_MESSAGES: usize = 3;

/// Messages handed to the image scenario planner.
const SCENARIO_MESSAGES: usize = 5;

/// Stores personal facts from the latest user message.
pub struct MemoryExtractionNode;

#[async_trait]
impl Node for MemoryExtractionNode {
    async fn run(&self, state: &mut CompanionState, ctx: &RunContext) -> Result<(), NodeError> {
        let Some(last) = state.last_message() else {
            return Ok(());
        };
        let llm = ctx.backends.small_chat_model()?;
        ctx.memory
            .extract_and_store_memories(llm.as_ref(), last)
            .await?;
        Ok(())
    }
}

/// Decides between a text, image or audio reply.
pub struct RouterNode;

#[async_trait]
impl Node for RouterNode {
    async fn run(&self, state: &mut CompanionState, ctx: &RunContext) -> Result<(), NodeError> {
        let chain = get_router_chain(ctx.backends.as_ref())?;
        let recent = state.last_n(ctx.settings.router_messages_to_analyze);
        let response = chain.invoke(recent).await?;
        state.workflow = response.workflow();
        info!(workflow = %state.workflow, "Turn routed");
        Ok(())
    }
}

/// Looks up what Ava is doing right now.
pub struct ContextInjectionNode;

#[async_trait]
impl Node for ContextInjectionNode {
    async fn run(&self, state: &mut CompanionState, ctx: &RunContext) -> Result<(), NodeError> {
        let activity = ctx.schedule.current_activity().unwrap_or_default();
        state.apply_activity = activity != state.current_activity;
        if state.apply_activity {
            debug!(activity, "Activity changed");
        }
        state.current_activity = activity.to_string();
        Ok(())
    }
}

/// Pulls memories related to the recent conversation into the persona prompt.
pub struct MemoryInjectionNode;

#[async_trait]
impl Node for MemoryInjectionNode {
    async fn run(&self, state: &mut CompanionState, ctx: &RunContext) -> Result<(), NodeError> {
        let query = state
            .last_n(MEMORY_QUERY_MESSAGES)
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let memories = ctx.memory.get_relevant_memories(&query).await?;
        state.memory_context = format_memories_for_prompt(&memories);
        Ok(())
    }
}

/// Plain text reply.
pub struct ConversationNode;

#[async_trait]
impl Node for ConversationNode {
    async fn run(&self, state: &mut CompanionState, ctx: &RunContext) -> Result<(), NodeError> {
        let chain = get_character_response_chain(ctx.backends.as_ref(), &state.summary)?;
        let reply = chain
            .invoke(&state.messages, &state.memory_context, &state.current_activity)
            .await?;
        state.push(ChatMessage::assistant(reply));
        Ok(())
    }
}

/// Generates a picture of the scene, then replies about it.
pub struct ImageNode;

#[async_trait]
impl Node for ImageNode {
    async fn run(&self, state: &mut CompanionState, ctx: &RunContext) -> Result<(), NodeError> {
        let chain = get_character_response_chain(ctx.backends.as_ref(), &state.summary)?;
        let images = ctx.backends.text_to_image()?;

        let scenario = images
            .create_scenario(state.last_n(SCENARIO_MESSAGES))
            .await?;
        let path = ctx
            .settings
            .image_dir
            .join(format!("image_{}.png", Uuid::new_v4()));
        images.generate_image(&scenario.image_prompt, &path).await?;

        // The note only informs the reply; it is not kept in the history.
        let mut messages = state.messages.clone();
        messages.push(ChatMessage::user(format!(
            "<image attached by Ava generated from prompt: {}>",
            scenario.image_prompt
        )));
        let reply = chain
            .invoke(&messages, &state.memory_context, &state.current_activity)
            .await?;

        info!(path = %path.display(), "Image reply ready");
        state.push(ChatMessage::assistant(reply));
        state.image_path = Some(path);
        Ok(())
    }
}

/// Replies with a synthesized voice message.
pub struct AudioNode;

#[async_trait]
impl Node for AudioNode {
    async fn run(&self, state: &mut CompanionState, ctx: &RunContext) -> Result<(), NodeError> {
        let chain = get_character_response_chain(ctx.backends.as_ref(), &state.summary)?;
        let speech = ctx.backends.text_to_speech()?;

        let reply = chain
            .invoke(&state.messages, &state.memory_context, &state.current_activity)
            .await?;
        let audio = speech.synthesize(&reply).await?;

        info!(bytes = audio.len(), "Audio reply ready");
        state.push(ChatMessage::assistant(reply));
        state.audio_buffer = Some(audio);
        Ok(())
    }
}

/// Folds old messages into the running summary and drops them.
pub struct SummarizeConversationNode;

#[async_trait]
impl Node for SummarizeConversationNode {
    async fn run(&self, state: &mut CompanionState, ctx: &RunContext) -> Result<(), NodeError> {
        let instruction = if state.summary.is_empty() {
            CREATE_SUMMARY_PROMPT.to_string()
        } else {
            EXTEND_SUMMARY_PROMPT.replace("{summary}", &state.summary)
        };

        let mut messages = state.messages.clone();
        messages.push(ChatMessage::user(instruction));
        let llm = ctx.backends.chat_model(DEFAULT_TEMPERATURE)?;
        let response = llm.complete(CompletionRequest::new(messages)).await?;

        let keep = ctx.settings.total_messages_after_summary;
        let dropped = state.messages.len().saturating_sub(keep);
        state.messages.drain(..dropped);
        state.summary = response.content;

        info!(dropped, kept = state.messages.len(), "Conversation summarized");
        Ok(())
    }
}
