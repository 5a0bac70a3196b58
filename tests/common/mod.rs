//! Shared test utilities
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use vista_gateway::booking::{self, BookingStore};
use vista_gateway::context::{FunctionCall, ToolCall};
use vista_gateway::providers::{ChatRequest, ChatResponse, TextGenerator};
use vista_gateway::{Error, Message, Result, Role};

/// One scripted model response
pub enum ScriptStep {
    /// Reply with this assistant message
    Reply(Message),
    /// Fail the call with an LLM error
    Fail(String),
}

/// A plain-text scripted reply
#[must_use]
pub fn assistant(text: &str) -> ScriptStep {
    ScriptStep::Reply(Message::assistant(text))
}

/// A scripted reply that invokes one tool
#[must_use]
pub fn tool_call(name: &str, arguments: &str) -> ScriptStep {
    ScriptStep::Reply(Message {
        role: Role::Assistant,
        content: None,
        tool_calls: Some(vec![ToolCall {
            id: format!("call_{name}"),
            kind: "function".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }]),
        tool_call_id: None,
    })
}

/// In-process text generator replaying a fixed script.
///
/// Records every request; optionally blocks each call on a semaphore so
/// tests can hold a "model call" in flight deterministically.
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<ScriptStep>>,
    requests: Mutex<Vec<ChatRequest>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedGenerator {
    /// A generator that answers immediately from the script
    #[must_use]
    pub fn new(steps: Vec<ScriptStep>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    /// A generator whose calls block until the returned semaphore receives
    /// a permit
    #[must_use]
    pub fn gated(steps: Vec<ScriptStep>) -> (Arc<Self>, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let generator = Arc::new(Self {
            script: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
            gate: Some(Arc::clone(&gate)),
        });
        (generator, gate)
    }

    /// How many generate calls have been made
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    /// Copies of every request received so far
    #[must_use]
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().expect("requests lock").push(request);

        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| Error::Llm("test gate closed".to_string()))?;
            permit.forget();
        }

        let step = self.script.lock().expect("script lock").pop_front();
        match step {
            None => Ok(ChatResponse::from_message(Message::assistant(
                "nothing scripted",
            ))),
            Some(ScriptStep::Reply(message)) => Ok(ChatResponse::from_message(message)),
            Some(ScriptStep::Fail(message)) => Err(Error::Llm(message)),
        }
    }
}

/// Set up a seeded in-memory booking store
#[must_use]
pub fn seeded_store() -> BookingStore {
    let pool = booking::init_memory().expect("failed to init test db");
    let store = BookingStore::new(pool);
    store.seed_rooms().expect("failed to seed rooms");
    store
}
