//! Agentic turn runner
//!
//! Drives one conversational turn to completion: call the model with the
//! running context and tool set, execute any tool calls through the
//! dispatcher, feed results back, and loop until the model produces a plain
//! reply or a tool suppresses the follow-up turn.

use std::sync::Arc;

use serde_json::Value;

use crate::context::{Message, SharedContext};
use crate::providers::{ChatRequest, TextGenerator, ToolDefinition};
use crate::tools::ToolDispatcher;
use crate::{Error, Result};

/// Configuration for a single conversational turn
#[derive(Debug, Clone)]
pub struct TurnConfig {
    /// Model identifier; empty uses the client default
    pub model: String,
    /// Max tokens per completion
    pub max_tokens: u32,
    /// Max tool-call rounds per turn
    pub max_iterations: u32,
    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            max_tokens: 1024,
            max_iterations: 8,
            temperature: None,
        }
    }
}

/// What a completed turn produced
#[derive(Debug, Clone, Default)]
pub struct TurnOutcome {
    /// Final assistant reply, absent when a tool suppressed the follow-up
    pub reply: Option<String>,
    /// Fixed lines queued by tools, spoken before the reply
    pub speak_lines: Vec<String>,
    /// Whether a tool asked the session to end
    pub end_session: bool,
}

/// Run one full turn against the shared context.
///
/// Assistant and tool messages are appended to the context as they are
/// produced, so the history always reflects what the model actually saw.
///
/// # Errors
///
/// Returns error if a model call fails; tool failures never propagate,
/// they come back to the model as structured error payloads.
pub async fn run_turn(
    context: &SharedContext,
    generator: &Arc<dyn TextGenerator>,
    dispatcher: &ToolDispatcher,
    tools: &[ToolDefinition],
    config: &TurnConfig,
) -> Result<TurnOutcome> {
    let mut speak_lines = Vec::new();
    let mut end_session = false;

    for round in 0..config.max_iterations {
        let request = ChatRequest {
            model: config.model.clone(),
            messages: context.snapshot(),
            temperature: config.temperature,
            max_tokens: Some(config.max_tokens),
            tools: Some(tools.to_vec()),
        };

        let response = generator.generate(request).await?;
        let message = response
            .message()
            .cloned()
            .ok_or_else(|| Error::Llm("chat response contained no choices".to_string()))?;

        let tool_calls = message.tool_calls.clone().unwrap_or_default();
        context.push(message.clone());

        if tool_calls.is_empty() {
            return Ok(TurnOutcome {
                reply: message.text().filter(|text| !text.is_empty()),
                speak_lines,
                end_session,
            });
        }

        tracing::debug!(round, calls = tool_calls.len(), "executing tool calls");

        let mut run_llm = false;
        for call in &tool_calls {
            let arguments: Value = serde_json::from_str(&call.function.arguments)
                .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

            let outcome = dispatcher.dispatch(&call.function.name, &arguments).await;
            if let Some(line) = outcome.speak {
                speak_lines.push(line);
            }
            end_session |= outcome.end_session;
            run_llm |= outcome.run_llm;

            context.push(Message::tool(call.id.clone(), outcome.result.to_string()));
        }

        // Hold and end-call results do not trigger another model turn
        if !run_llm || end_session {
            return Ok(TurnOutcome {
                reply: None,
                speak_lines,
                end_session,
            });
        }
    }

    tracing::warn!(
        limit = config.max_iterations,
        "turn stopped at iteration limit"
    );
    Ok(TurnOutcome {
        reply: None,
        speak_lines,
        end_session,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::booking::{self, BookingStore};
    use crate::context::{FunctionCall, Role, ToolCall};
    use crate::gate::HoldState;
    use crate::providers::ChatResponse;
    use crate::tools;

    /// Replays a fixed sequence of responses
    struct ScriptedGenerator {
        script: Mutex<Vec<Message>>,
    }

    impl ScriptedGenerator {
        fn new(script: Vec<Message>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _request: ChatRequest) -> Result<ChatResponse> {
            let mut script = self.script.lock().expect("script lock");
            let message = if script.is_empty() {
                Message::assistant("nothing scripted")
            } else {
                script.remove(0)
            };
            Ok(ChatResponse::from_message(message))
        }
    }

    fn tool_call_message(name: &str, arguments: &str) -> Message {
        Message {
            role: Role::Assistant,
            content: None,
            tool_calls: Some(vec![ToolCall {
                id: "call_1".to_string(),
                kind: "function".to_string(),
                function: FunctionCall {
                    name: name.to_string(),
                    arguments: arguments.to_string(),
                },
            }]),
            tool_call_id: None,
        }
    }

    fn dispatcher() -> ToolDispatcher {
        let pool = booking::init_memory().expect("init db");
        let store = BookingStore::new(pool);
        store.seed_rooms().expect("seed");
        ToolDispatcher::new(store, HoldState::new())
    }

    #[tokio::test]
    async fn plain_reply_ends_turn() {
        let context = SharedContext::new("sys");
        context.push(Message::user("hi"));
        let generator: Arc<dyn TextGenerator> =
            ScriptedGenerator::new(vec![Message::assistant("hello there")]);
        let tool_defs = tools::concierge_tools();

        let outcome = run_turn(
            &context,
            &generator,
            &dispatcher(),
            &tool_defs,
            &TurnConfig::default(),
        )
        .await
        .expect("turn");

        assert_eq!(outcome.reply.as_deref(), Some("hello there"));
        assert!(!outcome.end_session);
        // sys + user + assistant
        assert_eq!(context.len(), 3);
    }

    #[tokio::test]
    async fn tool_round_feeds_result_back() {
        let context = SharedContext::new("sys");
        context.push(Message::user("how much is a suite?"));
        let generator: Arc<dyn TextGenerator> = ScriptedGenerator::new(vec![
            tool_call_message(tools::GET_PRICING, r#"{"room_type": "suite"}"#),
            Message::assistant("A suite is 250 per night."),
        ]);
        let tool_defs = tools::concierge_tools();

        let outcome = run_turn(
            &context,
            &generator,
            &dispatcher(),
            &tool_defs,
            &TurnConfig::default(),
        )
        .await
        .expect("turn");

        assert_eq!(outcome.reply.as_deref(), Some("A suite is 250 per night."));

        let messages = context.snapshot();
        // sys, user, assistant tool-call, tool result, assistant reply
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[3].role, Role::Tool);
        let payload: serde_json::Value =
            serde_json::from_str(&messages[3].text().expect("tool text")).expect("json");
        assert_eq!(payload["price_per_night"], json!(250));
    }

    #[tokio::test]
    async fn hold_tool_suppresses_follow_up_turn() {
        let context = SharedContext::new("sys");
        context.push(Message::user("hold on a second"));
        let generator: Arc<dyn TextGenerator> =
            ScriptedGenerator::new(vec![tool_call_message(tools::PUT_ON_HOLD, "{}")]);
        let tool_defs = tools::concierge_tools();

        let outcome = run_turn(
            &context,
            &generator,
            &dispatcher(),
            &tool_defs,
            &TurnConfig::default(),
        )
        .await
        .expect("turn");

        assert!(outcome.reply.is_none());
        assert_eq!(outcome.speak_lines.len(), 1);
        assert!(!outcome.end_session);
    }
}
