//! Long-term memory: decide which user messages hold facts worth keeping,
//! store them, and recall the relevant ones for the persona prompt.

pub mod similarity;

use std::sync::Arc;

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::MemoryError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider, Role, complete_structured};
use crate::prompts::MEMORY_ANALYSIS_PROMPT;
use crate::store::{MemoryStore, StoredMemory};

pub use similarity::lexical_similarity;

/// A new memory this close to a stored one counts as a duplicate.
pub const DUPLICATE_THRESHOLD: f32 = 0.9;

/// Result of analyzing a message for memory-worthy content
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct MemoryAnalysis {
    /// Whether the message is important enough to be stored as a memory
    pub is_important: bool,
    /// The formatted memory to be stored
    #[serde(default)]
    pub formatted_memory: Option<String>,
}

/// Render stored memories as `- fact` lines. Empty input renders as `""`.
pub fn format_memories_for_prompt(memories: &[String]) -> String {
    memories
        .iter()
        .map(|m| format!("- {m}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct MemoryManager {
    store: Arc<dyn MemoryStore>,
    top_k: usize,
}

impl MemoryManager {
    pub fn new(store: Arc<dyn MemoryStore>, top_k: usize) -> Self {
        Self { store, top_k }
    }

    /// Ask `llm` whether `content` holds a personal fact.
    pub async fn analyze(
        &self,
        llm: &dyn LlmProvider,
        content: &str,
    ) -> Result<MemoryAnalysis, MemoryError> {
        let prompt = MEMORY_ANALYSIS_PROMPT.replace("{message}", content);
        let request = CompletionRequest::new(vec![ChatMessage::user(prompt)]);
        Ok(complete_structured(llm, request).await?)
    }

    /// Analyze a user message and store the fact it carries, unless a
    /// near-identical memory already exists. Returns the stored memory.
    pub async fn extract_and_store_memories(
        &self,
        llm: &dyn LlmProvider,
        message: &ChatMessage,
    ) -> Result<Option<StoredMemory>, MemoryError> {
        if message.role != Role::User {
            return Ok(None);
        }

        let analysis = self.analyze(llm, &message.content).await?;
        let Some(text) = analysis
            .formatted_memory
            .filter(|m| analysis.is_important && !m.trim().is_empty())
        else {
            debug!("Message holds nothing worth remembering");
            return Ok(None);
        };

        if let Some((existing, score)) = self.find_similar(&text).await? {
            debug!(memory = %existing.text, score, "Similar memory already stored");
            return Ok(None);
        }

        let memory = StoredMemory::new(text);
        self.store.insert_memory(&memory).await?;
        info!(memory = %memory.text, "Stored new memory");
        Ok(Some(memory))
    }

    /// Best stored match for `text` at or above `DUPLICATE_THRESHOLD`.
    pub async fn find_similar(
        &self,
        text: &str,
    ) -> Result<Option<(StoredMemory, f32)>, MemoryError> {
        Ok(self
            .ranked(text)
            .await?
            .into_iter()
            .next()
            .filter(|(_, score)| *score >= DUPLICATE_THRESHOLD))
    }

    /// Up to `top_k` memories related to `context`, most relevant first.
    pub async fn get_relevant_memories(&self, context: &str) -> Result<Vec<String>, MemoryError> {
        let memories: Vec<String> = self
            .ranked(context)
            .await?
            .into_iter()
            .take(self.top_k)
            .map(|(memory, _)| memory.text)
            .collect();
        debug!(found = memories.len(), "Retrieved memories");
        Ok(memories)
    }

    /// Memories with a positive score against `query`, best first.
    async fn ranked(&self, query: &str) -> Result<Vec<(StoredMemory, f32)>, MemoryError> {
        let mut scored: Vec<(StoredMemory, f32)> = self
            .store
            .list_memories()
            .await?
            .into_iter()
            .map(|memory| {
                let score = lexical_similarity(query, &memory.text);
                (memory, score)
            })
            .filter(|(_, score)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::context::test_support::StubLlm;
    use crate::store::LibSqlBackend;

    async fn manager(top_k: usize) -> (MemoryManager, Arc<LibSqlBackend>) {
        let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        (MemoryManager::new(db.clone(), top_k), db)
    }

    #[test]
    fn format_lines() {
        assert_eq!(format_memories_for_prompt(&[]), "");
        assert_eq!(
            format_memories_for_prompt(&["Loves ramen".into(), "Lives in SF".into()]),
            "- Loves ramen\n- Lives in SF"
        );
    }

    #[tokio::test]
    async fn stores_important_fact() {
        let (manager, db) = manager(3).await;
        let llm = StubLlm::new().with_memory(Some("Works as an engineer"));

        let stored = manager
            .extract_and_store_memories(&llm, &ChatMessage::user("I work as an engineer"))
            .await
            .unwrap();
        assert_eq!(stored.unwrap().text, "Works as an engineer");
        assert_eq!(db.list_memories().await.unwrap().len(), 1);

        let prompt = &llm.requests()[0].messages[0].content;
        assert!(prompt.ends_with("Message: I work as an engineer"));
    }

    #[tokio::test]
    async fn skips_unimportant_and_non_user_messages() {
        let (manager, db) = manager(3).await;
        let llm = StubLlm::new().with_memory(None);

        let stored = manager
            .extract_and_store_memories(&llm, &ChatMessage::user("can you remember stuff?"))
            .await
            .unwrap();
        assert!(stored.is_none());

        let stored = manager
            .extract_and_store_memories(&llm, &ChatMessage::assistant("I'm Ava"))
            .await
            .unwrap();
        assert!(stored.is_none());
        assert_eq!(llm.requests().len(), 1);
        assert!(db.list_memories().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_is_not_stored_twice() {
        let (manager, db) = manager(3).await;
        let llm = StubLlm::new().with_memory(Some("Loves Star Wars"));

        for _ in 0..2 {
            manager
                .extract_and_store_memories(&llm, &ChatMessage::user("I love Star Wars"))
                .await
                .unwrap();
        }
        assert_eq!(db.list_memories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn relevant_memories_ranked_and_capped() {
        let (manager, db) = manager(2).await;
        for text in [
            "Lives in Boston",
            "Loves ramen in San Francisco",
            "Works in San Francisco as an engineer",
            "Has a cat",
        ] {
            db.insert_memory(&StoredMemory::new(text)).await.unwrap();
        }

        let found = manager
            .get_relevant_memories("any good ramen spots in San Francisco?")
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], "Loves ramen in San Francisco");

        let none = manager.get_relevant_memories("xyz").await.unwrap();
        assert!(none.is_empty());
    }
}
