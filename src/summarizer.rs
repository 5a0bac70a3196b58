//! Rolling context summarization
//!
//! Bounds conversation-history size without blocking the live pipeline.
//! When the message count crosses a threshold at a turn boundary, the
//! oldest span is summarized via an auxiliary LLM call running as a
//! background task; the result is staged and merged at a later turn
//! boundary, so no message appended mid-compaction is ever lost.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::context::{Message, SharedContext, render_transcript};
use crate::prompt::{DEFAULT_SUMMARY_INSTRUCTION, SUMMARIZER_SYSTEM_PROMPT};
use crate::providers::{ChatRequest, TextGenerator};
use crate::{Error, Result};

/// Rolling summarizer configuration
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    /// Message count that triggers compaction
    pub threshold: usize,
    /// Trailing messages exempt from compaction
    pub keep_recent: usize,
    /// Instruction template; `{conversation}` receives the transcript
    pub summary_instruction: String,
    /// Bound on the auxiliary call, so a hung request cannot wedge the
    /// single-flight guard
    pub request_timeout: Duration,
    /// Model for the auxiliary call; empty uses the client default
    pub model: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            threshold: 100,
            keep_recent: 20,
            summary_instruction: DEFAULT_SUMMARY_INSTRUCTION.to_string(),
            request_timeout: Duration::from_secs(30),
            model: String::new(),
        }
    }
}

/// Staged output of a finished compaction run, waiting for a safe point
#[derive(Debug)]
struct PendingMerge {
    /// Message count when the run snapshotted the context
    snapshot_len: usize,
    /// System prompt + summary + preserved tail, captured at snapshot time
    messages: Vec<Message>,
}

/// Compacts old conversation history through an auxiliary LLM call
pub struct RollingSummarizer {
    context: SharedContext,
    generator: Arc<dyn TextGenerator>,
    config: SummarizerConfig,
    pending: Arc<Mutex<Option<PendingMerge>>>,
    task: Option<JoinHandle<()>>,
}

impl RollingSummarizer {
    /// Create a summarizer observing `context`
    #[must_use]
    pub fn new(
        context: SharedContext,
        generator: Arc<dyn TextGenerator>,
        config: SummarizerConfig,
    ) -> Self {
        tracing::info!(
            threshold = config.threshold,
            keep_recent = config.keep_recent,
            "rolling summarizer initialized"
        );
        Self {
            context,
            generator,
            config,
            pending: Arc::new(Mutex::new(None)),
            task: None,
        }
    }

    /// Safe-point hook: the host calls this once per completed model turn.
    ///
    /// Applies a staged merge from a previous run first, then starts a new
    /// background compaction if the threshold is crossed and none is in
    /// flight.
    pub fn on_turn_boundary(&mut self) {
        self.apply_pending_merge();

        let current_len = self.context.len();
        if current_len >= self.config.threshold && !self.is_running() {
            tracing::info!(
                messages = current_len,
                threshold = self.config.threshold,
                "context threshold reached, starting compaction"
            );
            self.spawn_compaction();
        }
    }

    /// Whether a compaction task is currently in flight
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Cancel an in-flight compaction and drop any staged merge, leaving
    /// the live context untouched. Called at session end.
    pub fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        *self.lock_pending() = None;
    }

    /// Wait for an in-flight compaction to finish, then apply its result.
    ///
    /// A host-driven safe point, used at controlled shutdown and in tests.
    pub async fn flush(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    tracing::warn!(error = %e, "compaction task failed");
                }
            }
        }
        self.apply_pending_merge();
    }

    /// Snapshot the context and run the compaction in the background
    fn spawn_compaction(&mut self) {
        let snapshot = self.context.snapshot();
        let snapshot_len = snapshot.len();

        // Nothing between the system prompt and the preserved tail
        if snapshot_len <= self.config.keep_recent + 1 {
            tracing::debug!(messages = snapshot_len, "not enough messages to summarize");
            return;
        }

        let split = snapshot_len - self.config.keep_recent;
        let system_message = snapshot[0].clone();
        let span = snapshot[1..split].to_vec();
        let tail = snapshot[split..].to_vec();

        tracing::info!(
            summarizing = span.len(),
            keeping = tail.len(),
            "compaction run started"
        );

        let transcript = render_transcript(&span);
        let generator = Arc::clone(&self.generator);
        let pending = Arc::clone(&self.pending);
        let instruction = self.config.summary_instruction.clone();
        let model = self.config.model.clone();
        let request_timeout = self.config.request_timeout;

        self.task = Some(tokio::spawn(async move {
            let summary = tokio::time::timeout(
                request_timeout,
                summarize(generator, model, instruction, transcript),
            )
            .await;

            let summary_text = match summary {
                Err(_) => {
                    tracing::warn!("compaction summarization timed out");
                    return;
                }
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "compaction summarization failed");
                    return;
                }
                Ok(Ok(text)) => text,
            };

            let summary_message = Message::assistant(format!(
                "[Previous conversation summary: {summary_text}]"
            ));

            let mut messages = Vec::with_capacity(tail.len() + 2);
            messages.push(system_message);
            messages.push(summary_message);
            messages.extend(tail);

            tracing::info!(
                compacted = messages.len(),
                from = snapshot_len,
                "compaction complete, merge staged"
            );

            *pending
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(PendingMerge {
                snapshot_len,
                messages,
            });
        }));
    }

    /// Replace the live history with the staged merge, keeping everything
    /// appended since the snapshot
    fn apply_pending_merge(&mut self) {
        let Some(merge) = self.lock_pending().take() else {
            return;
        };

        let (total, carried) = self
            .context
            .merge_compacted(merge.snapshot_len, merge.messages);

        tracing::info!(
            messages = total,
            appended_during_compaction = carried,
            "context merged"
        );
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<PendingMerge>> {
        self.pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Run the auxiliary summarization call
async fn summarize(
    generator: Arc<dyn TextGenerator>,
    model: String,
    instruction: String,
    transcript: String,
) -> Result<String> {
    let prompt = instruction.replace("{conversation}", &transcript);

    let request = ChatRequest {
        model,
        messages: vec![
            Message::system(SUMMARIZER_SYSTEM_PROMPT),
            Message::user(prompt),
        ],
        temperature: Some(0.3),
        max_tokens: Some(300),
        tools: None,
    };

    let response = generator.generate(request).await?;
    response
        .text()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| Error::Summarizer("summarization returned empty result".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::providers::ChatResponse;

    /// Generator that counts calls and replies with a fixed summary
    struct CountingGenerator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for CountingGenerator {
        async fn generate(&self, _request: ChatRequest) -> Result<ChatResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ChatResponse::from_message(Message::assistant("the summary")))
        }
    }

    fn filled_context(turns: usize) -> SharedContext {
        let context = SharedContext::new("system prompt");
        for i in 0..turns {
            context.push(Message::user(format!("question {i}")));
            context.push(Message::assistant(format!("answer {i}")));
        }
        context
    }

    #[tokio::test]
    async fn below_threshold_never_compacts() {
        let context = filled_context(10);
        let generator = Arc::new(CountingGenerator {
            calls: AtomicUsize::new(0),
        });
        let config = SummarizerConfig {
            threshold: 100,
            keep_recent: 3,
            ..Default::default()
        };
        let mut summarizer = RollingSummarizer::new(context.clone(), generator.clone(), config);

        for _ in 0..20 {
            summarizer.on_turn_boundary();
            summarizer.flush().await;
        }

        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(context.len(), 21);
    }

    #[tokio::test]
    async fn too_small_span_is_left_alone() {
        // Threshold crossed, but everything after the system prompt is
        // inside the keep_recent tail
        let context = filled_context(2);
        let generator = Arc::new(CountingGenerator {
            calls: AtomicUsize::new(0),
        });
        let config = SummarizerConfig {
            threshold: 4,
            keep_recent: 10,
            ..Default::default()
        };
        let mut summarizer = RollingSummarizer::new(context.clone(), generator.clone(), config);

        summarizer.on_turn_boundary();
        summarizer.flush().await;

        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(context.len(), 5);
    }

    #[tokio::test]
    async fn compacted_shape_is_system_summary_tail() {
        // 1 system + 9 turn messages
        let context = SharedContext::new("system prompt");
        for i in 0..9 {
            context.push(Message::user(format!("message {i}")));
        }
        let generator = Arc::new(CountingGenerator {
            calls: AtomicUsize::new(0),
        });
        let config = SummarizerConfig {
            threshold: 10,
            keep_recent: 3,
            ..Default::default()
        };
        let mut summarizer = RollingSummarizer::new(context.clone(), generator, config);

        summarizer.on_turn_boundary();
        summarizer.flush().await;

        let messages = context.snapshot();
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0].text().as_deref(), Some("system prompt"));
        assert!(
            messages[1]
                .text()
                .expect("summary text")
                .starts_with("[Previous conversation summary:")
        );
        assert_eq!(messages[2].text().as_deref(), Some("message 6"));
        assert_eq!(messages[3].text().as_deref(), Some("message 7"));
        assert_eq!(messages[4].text().as_deref(), Some("message 8"));
    }
}
