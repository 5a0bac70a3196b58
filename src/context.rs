//! Conversation context store
//!
//! An ordered, role-tagged message history shared by the pipeline stages.
//! Append-only except for the rolling summarizer's compaction rewrite.
//! The first message is always the system prompt and is never removed.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Role of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    /// Display form used when rendering transcripts
    #[must_use]
    pub const fn as_display_str(self) -> &'static str {
        match self {
            Self::System => "SYSTEM",
            Self::User => "USER",
            Self::Assistant => "ASSISTANT",
            Self::Tool => "TOOL",
        }
    }
}

/// One part of structured message content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text part
    Text { text: String },
}

/// Message content, either plain text or structured parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl Content {
    /// Flatten to the text-bearing parts only
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .map(|ContentPart::Text { text }| text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// A model-requested tool invocation attached to an assistant message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionCall,
}

/// The function payload of a tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments, exactly as produced by the model
    pub arguments: String,
}

/// A single conversation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    /// Build a system message
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::plain(Role::System, text)
    }

    /// Build a user message
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::plain(Role::User, text)
    }

    /// Build an assistant message
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, text)
    }

    /// Build a tool-result message bound to a tool call
    #[must_use]
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(Content::Text(content.into())),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    fn plain(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(Content::Text(text.into())),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// The text-bearing content of this message, if any
    #[must_use]
    pub fn text(&self) -> Option<String> {
        self.content.as_ref().map(Content::as_text)
    }
}

/// Shared handle to the conversation history of one session.
///
/// Exactly two writers mutate it: the ordinary turn append and the rolling
/// summarizer's merge. Both run on the session's event loop and take the
/// lock for short, non-await critical sections only.
#[derive(Clone)]
pub struct SharedContext {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl SharedContext {
    /// Create a context seeded with the system prompt
    #[must_use]
    pub fn new(system_prompt: &str) -> Self {
        Self {
            messages: Arc::new(Mutex::new(vec![Message::system(system_prompt)])),
        }
    }

    /// Append one message
    pub fn push(&self, message: Message) {
        self.lock().push(message);
    }

    /// Current message count
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the context holds no messages
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Clone the full message list
    #[must_use]
    pub fn snapshot(&self) -> Vec<Message> {
        self.lock().clone()
    }

    /// Replace the history with a compacted prefix, preserving everything
    /// appended after `snapshot_len`.
    ///
    /// Returns the resulting length and how many live messages were carried
    /// over from after the snapshot point.
    pub fn merge_compacted(
        &self,
        snapshot_len: usize,
        mut compacted: Vec<Message>,
    ) -> (usize, usize) {
        let mut messages = self.lock();
        let new_since_snapshot: Vec<Message> =
            messages.get(snapshot_len..).unwrap_or_default().to_vec();
        let carried = new_since_snapshot.len();
        compacted.extend(new_since_snapshot);
        *messages = compacted;
        (messages.len(), carried)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Message>> {
        // Writers never panic while holding the lock; recover if one did.
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Render a span of messages into a role-tagged transcript.
///
/// Structured content keeps only its text-bearing parts; messages with no
/// text (pure tool-call frames) are skipped.
#[must_use]
pub fn render_transcript(messages: &[Message]) -> String {
    let mut lines = Vec::new();
    for message in messages {
        if let Some(text) = message.text() {
            if !text.is_empty() {
                lines.push(format!("{}: {text}", message.role.as_display_str()));
            }
        }
    }
    lines.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_system_prompt() {
        let context = SharedContext::new("be helpful");
        let messages = context.snapshot();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].text().as_deref(), Some("be helpful"));
    }

    #[test]
    fn merge_preserves_messages_appended_after_snapshot() {
        let context = SharedContext::new("sys");
        context.push(Message::user("one"));
        context.push(Message::assistant("two"));
        let snapshot_len = context.len();
        context.push(Message::user("late"));

        let compacted = vec![Message::system("sys"), Message::assistant("summary")];
        let (len, carried) = context.merge_compacted(snapshot_len, compacted);

        assert_eq!(len, 3);
        assert_eq!(carried, 1);
        let messages = context.snapshot();
        assert_eq!(messages[2].text().as_deref(), Some("late"));
    }

    #[test]
    fn transcript_flattens_structured_content() {
        let parts = Message {
            role: Role::User,
            content: Some(Content::Parts(vec![
                ContentPart::Text {
                    text: "first".to_string(),
                },
                ContentPart::Text {
                    text: "second".to_string(),
                },
            ])),
            tool_calls: None,
            tool_call_id: None,
        };
        let rendered = render_transcript(&[Message::assistant("hi"), parts]);
        assert_eq!(rendered, "ASSISTANT: hi\n\nUSER: first second");
    }

    #[test]
    fn message_wire_shape_round_trips() {
        let message = Message {
            role: Role::Assistant,
            content: None,
            tool_calls: Some(vec![ToolCall {
                id: "call_1".to_string(),
                kind: "function".to_string(),
                function: FunctionCall {
                    name: "get_pricing".to_string(),
                    arguments: "{}".to_string(),
                },
            }]),
            tool_call_id: None,
        };
        let json = serde_json::to_value(&message).expect("serialize");
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["tool_calls"][0]["type"], "function");
        let back: Message = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, message);
    }
}
