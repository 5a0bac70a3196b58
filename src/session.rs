//! Session pipeline runner
//!
//! Composes the hold/wake gate, idle monitor, context store, rolling
//! summarizer, tool dispatcher, and providers into one turn-taking loop,
//! driven by lifecycle and transcript events until the client disconnects
//! or a tool ends the call.
//!
//! Processing is cooperative and single-threaded: each event is handled to
//! completion on this loop, suspending only at external service calls. The
//! summarizer's auxiliary call is the one deliberate exception, running as
//! an independent task so conversation turns keep flowing while it waits.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::agent::{self, TurnConfig};
use crate::context::{Message, SharedContext};
use crate::frames::Frame;
use crate::gate::HoldWakeGate;
use crate::idle::{IdleConfig, IdleDecision, IdleMonitor};
use crate::prompt::{
    GREETING_INSTRUCTION, IDLE_GOODBYE, IDLE_NUDGE_FIRST, IDLE_NUDGE_SECOND, SYSTEM_PROMPT,
};
use crate::providers::{SpeechRecognizer, SpeechSynthesizer, TextGenerator, ToolDefinition};
use crate::summarizer::{RollingSummarizer, SummarizerConfig};
use crate::tools::{ToolDispatcher, concierge_tools};
use crate::Result;
use crate::booking::BookingStore;
use crate::wake::WakeMatcher;

/// Inbound session events, produced by the transport layer
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Client connected; triggers the greeting turn
    Connected,
    /// Client disconnected; cancels all in-flight work
    Disconnected,
    /// Recognized speech text (text transports, or pre-transcribed audio)
    Transcript(String),
    /// Raw WAV audio to transcribe
    Audio(Vec<u8>),
}

/// Outbound session events, consumed by the transport layer
#[derive(Debug, Clone)]
pub enum SessionOutput {
    /// Assistant text to display or log
    Reply(String),
    /// Synthesized speech audio
    Speech(Vec<u8>),
    /// The session has ended
    Ended,
}

/// Per-session tuning knobs
#[derive(Clone)]
pub struct SessionParams {
    pub system_prompt: String,
    pub wake_phrases: Vec<String>,
    pub turn: TurnConfig,
    pub idle: IdleConfig,
    pub summarizer: SummarizerConfig,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
            wake_phrases: crate::prompt::DEFAULT_WAKE_PHRASES
                .iter()
                .map(ToString::to_string)
                .collect(),
            turn: TurnConfig::default(),
            idle: IdleConfig::default(),
            summarizer: SummarizerConfig::default(),
        }
    }
}

/// One live conversation
pub struct Session {
    outputs: mpsc::Sender<SessionOutput>,
    generator: Arc<dyn TextGenerator>,
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    context: SharedContext,
    gate: HoldWakeGate,
    idle: IdleMonitor,
    summarizer: RollingSummarizer,
    dispatcher: ToolDispatcher,
    tools: Vec<ToolDefinition>,
    turn_config: TurnConfig,
}

impl Session {
    /// Wire up a session around its collaborators
    ///
    /// # Errors
    ///
    /// Returns error if the wake phrase list fails to compile.
    pub fn new(
        params: SessionParams,
        generator: Arc<dyn TextGenerator>,
        recognizer: Option<Arc<dyn SpeechRecognizer>>,
        synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
        booking: BookingStore,
        outputs: mpsc::Sender<SessionOutput>,
    ) -> Result<Self> {
        let matcher = WakeMatcher::new(params.wake_phrases.iter().cloned())?;
        let gate = HoldWakeGate::new(matcher);
        let dispatcher = ToolDispatcher::new(booking, gate.state());
        let context = SharedContext::new(&params.system_prompt);
        let summarizer = RollingSummarizer::new(
            context.clone(),
            Arc::clone(&generator),
            params.summarizer,
        );

        Ok(Self {
            outputs,
            generator,
            recognizer,
            synthesizer,
            context,
            gate,
            idle: IdleMonitor::new(params.idle),
            summarizer,
            dispatcher,
            tools: concierge_tools(),
            turn_config: params.turn,
        })
    }

    /// Drive the session until disconnect or a tool ends the call.
    ///
    /// # Errors
    ///
    /// Returns error only on internal channel failures; provider and tool
    /// errors are absorbed and the loop keeps running.
    pub async fn run(mut self, mut events: mpsc::Receiver<SessionEvent>) -> Result<()> {
        tracing::info!("session started");

        loop {
            let ended = tokio::select! {
                event = events.recv() => match event {
                    None | Some(SessionEvent::Disconnected) => {
                        tracing::info!("client disconnected");
                        break;
                    }
                    Some(SessionEvent::Connected) => self.greet().await,
                    Some(SessionEvent::Transcript(text)) => self.handle_transcript(text).await,
                    Some(SessionEvent::Audio(audio)) => self.handle_audio(audio).await,
                },
                () = self.idle.expired() => self.handle_idle().await,
            };

            if ended {
                break;
            }
        }

        // Disconnect cancels in-flight work; a cancelled compaction leaves
        // the context untouched
        self.summarizer.abort();
        let _ = self.outputs.send(SessionOutput::Ended).await;
        tracing::info!("session ended");
        Ok(())
    }

    /// Greeting turn on client connect
    async fn greet(&mut self) -> bool {
        self.context.push(Message::system(GREETING_INSTRUCTION));
        self.take_turn().await
    }

    /// Run one inbound transcript through the gate and, if it survives,
    /// through a model turn
    async fn handle_transcript(&mut self, text: String) -> bool {
        self.idle.observe_input();

        let Some(Frame::Transcript(transcription)) =
            self.gate.process(Frame::transcript(text))
        else {
            return false;
        };

        self.context.push(Message::user(transcription.text));
        self.take_turn().await
    }

    /// Transcribe raw audio, then treat it as a transcript event
    async fn handle_audio(&mut self, audio: Vec<u8>) -> bool {
        let Some(recognizer) = self.recognizer.clone() else {
            tracing::warn!("audio event received but no recognizer configured");
            return false;
        };

        match recognizer.transcribe(&audio).await {
            Ok(text) if !text.trim().is_empty() => self.handle_transcript(text).await,
            Ok(_) => false,
            Err(e) => {
                tracing::warn!(error = %e, "transcription failed");
                false
            }
        }
    }

    /// Idle firing: suppress while on hold, nudge twice, then say goodbye
    async fn handle_idle(&mut self) -> bool {
        if self.gate.is_on_hold() {
            tracing::debug!("user idle but on hold - skipping idle prompt");
            self.idle.snooze();
            return false;
        }

        let retry_count = self.idle.fire();
        match self.idle_prompt(retry_count).await {
            IdleDecision::Continue => false,
            IdleDecision::Stop => true,
        }
    }

    /// Escalation policy for one idle firing
    async fn idle_prompt(&mut self, retry_count: u32) -> IdleDecision {
        if self.idle.exhausted() {
            tracing::info!(retry_count, "idle retries exhausted - ending session");
            self.emit_speech(IDLE_GOODBYE).await;
            return IdleDecision::Stop;
        }

        tracing::info!(retry_count, "user idle - nudging");
        let nudge = if retry_count == 1 {
            IDLE_NUDGE_FIRST
        } else {
            IDLE_NUDGE_SECOND
        };
        self.context.push(Message::system(nudge));

        if self.take_turn().await {
            IdleDecision::Stop
        } else {
            IdleDecision::Continue
        }
    }

    /// Run one model turn and emit whatever it produced.
    ///
    /// Returns true when the session should end. Turn failures are absorbed:
    /// the session stays alive and the context keeps whatever was appended.
    async fn take_turn(&mut self) -> bool {
        let outcome = agent::run_turn(
            &self.context,
            &self.generator,
            &self.dispatcher,
            &self.tools,
            &self.turn_config,
        )
        .await;

        let ended = match outcome {
            Ok(outcome) => {
                for line in &outcome.speak_lines {
                    self.emit_speech(line).await;
                }
                if let Some(reply) = &outcome.reply {
                    self.emit_speech(reply).await;
                }
                outcome.end_session
            }
            Err(e) => {
                tracing::error!(error = %e, "model turn failed");
                false
            }
        };

        // Turn boundary: the safe point for context compaction
        self.summarizer.on_turn_boundary();
        self.idle.snooze();
        ended
    }

    /// Send one spoken line to the transport, synthesizing when configured
    async fn emit_speech(&mut self, text: &str) {
        if self
            .outputs
            .send(SessionOutput::Reply(text.to_string()))
            .await
            .is_err()
        {
            tracing::debug!("output channel closed");
            return;
        }

        if let Some(synthesizer) = self.synthesizer.clone() {
            match synthesizer.synthesize(text).await {
                Ok(audio) => {
                    let _ = self.outputs.send(SessionOutput::Speech(audio)).await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "speech synthesis failed");
                }
            }
        }
    }
}
