//! Conversation state threaded through every node of a run.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::llm::ChatMessage;

/// Response modality chosen by the router.
///
/// Unknown labels fall back to `Conversation` rather than erroring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WorkflowKind {
    #[default]
    Conversation,
    Image,
    Audio,
}

impl WorkflowKind {
    /// Map a router label to a workflow. Only the exact lowercase labels
    /// match; anything else is plain conversation.
    pub fn from_label(label: &str) -> Self {
        match label {
            "image" => Self::Image,
            "audio" => Self::Audio,
            _ => Self::Conversation,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conversation => "conversation",
            Self::Image => "image",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for WorkflowKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WorkflowKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

/// Mutable record owned by one run and passed by `&mut` to each node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanionState {
    /// Conversation history, oldest first.
    pub messages: Vec<ChatMessage>,
    /// Set by the router, consumed by modality dispatch.
    #[serde(default)]
    pub workflow: WorkflowKind,
    /// Running summary of messages already dropped from `messages`. Empty when none.
    #[serde(default)]
    pub summary: String,
    /// Formatted long-term memories for the persona prompt.
    #[serde(default)]
    pub memory_context: String,
    #[serde(default)]
    pub current_activity: String,
    /// Whether the activity changed since the previous turn.
    #[serde(default)]
    pub apply_activity: bool,

    #[serde(skip)]
    pub image_path: Option<PathBuf>,
    #[serde(skip)]
    pub audio_buffer: Option<Vec<u8>>,
}

impl CompanionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_messages(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Append a message to the history.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// The trailing `n` messages (all of them if fewer exist).
    pub fn last_n(&self, n: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// Drop per-turn outputs before starting a new turn.
    pub fn begin_turn(&mut self) {
        self.image_path = None;
        self.audio_buffer = None;
        self.workflow = WorkflowKind::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_label_maps_known_and_unknown() {
        assert_eq!(WorkflowKind::from_label("image"), WorkflowKind::Image);
        assert_eq!(WorkflowKind::from_label("audio"), WorkflowKind::Audio);
        assert_eq!(WorkflowKind::from_label("conversation"), WorkflowKind::Conversation);
        assert_eq!(WorkflowKind::from_label(""), WorkflowKind::Conversation);
        assert_eq!(WorkflowKind::from_label("unknown"), WorkflowKind::Conversation);
    }

    #[test]
    fn from_label_is_exact() {
        for label in ["IMAGE", "Image", " image ", "image\n", "Audio", "AUDIO", " audio"] {
            assert_eq!(
                WorkflowKind::from_label(label),
                WorkflowKind::Conversation,
                "label {label:?}"
            );
        }
    }

    #[test]
    fn workflow_deserializes_permissively() {
        let kind: WorkflowKind = serde_json::from_str("\"video\"").unwrap();
        assert_eq!(kind, WorkflowKind::Conversation);
        let kind: WorkflowKind = serde_json::from_str("\"audio\"").unwrap();
        assert_eq!(kind, WorkflowKind::Audio);
    }

    #[test]
    fn last_n_clamps() {
        let state = CompanionState::with_messages(vec![
            ChatMessage::user("a"),
            ChatMessage::assistant("b"),
            ChatMessage::user("c"),
        ]);
        assert_eq!(state.last_n(2).len(), 2);
        assert_eq!(state.last_n(2)[0].content, "b");
        assert_eq!(state.last_n(10).len(), 3);
        assert!(CompanionState::new().last_n(3).is_empty());
    }

    #[test]
    fn media_outputs_are_not_persisted() {
        let mut state = CompanionState::with_messages(vec![ChatMessage::user("hi")]);
        state.summary = "met before".into();
        state.audio_buffer = Some(vec![1, 2, 3]);
        state.image_path = Some(PathBuf::from("x.png"));

        let json = serde_json::to_string(&state).unwrap();
        let restored: CompanionState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.summary, "met before");
        assert_eq!(restored.messages.len(), 1);
        assert!(restored.audio_buffer.is_none());
        assert!(restored.image_path.is_none());
    }

    #[test]
    fn begin_turn_clears_outputs() {
        let mut state = CompanionState::new();
        state.workflow = WorkflowKind::Audio;
        state.audio_buffer = Some(vec![0]);
        state.begin_turn();
        assert_eq!(state.workflow, WorkflowKind::Conversation);
        assert!(state.audio_buffer.is_none());
    }
}
