//! Vista Gateway - voice concierge for hotel booking assistants
//!
//! This library wires speech-to-text, a tool-calling language model, and
//! text-to-speech into a turn-taking conversation pipeline, and adds the
//! two pieces of logic the providers don't give you:
//! - a hold/wake gate that silences the assistant's reaction to everything
//!   except designated wake phrases, and
//! - a rolling summarizer that keeps an unbounded conversation inside a
//!   context budget without stalling the live session.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                     Transport                          │
//! │     (telephony / web audio / console — external)       │
//! └──────────────────────────┬─────────────────────────────┘
//!                            │ events
//! ┌──────────────────────────▼─────────────────────────────┐
//! │                   Session pipeline                     │
//! │  STT → Idle Monitor → Hold/Wake Gate → Context → LLM   │
//! │         Tool Dispatch │ Rolling Summarizer │ TTS       │
//! └──────────────────────────┬─────────────────────────────┘
//!                            │
//! ┌──────────────────────────▼─────────────────────────────┐
//! │        Providers (OpenAI-compatible LLM, Whisper /     │
//! │        Deepgram STT, OpenAI / ElevenLabs TTS)          │
//! │               Booking service (SQLite)                 │
//! └────────────────────────────────────────────────────────┘
//! ```

pub mod agent;
pub mod booking;
pub mod config;
pub mod context;
pub mod error;
pub mod frames;
pub mod gate;
pub mod idle;
pub mod prompt;
pub mod providers;
pub mod session;
pub mod summarizer;
pub mod tools;
pub mod wake;

pub use config::Config;
pub use context::{Content, ContentPart, Message, Role, SharedContext};
pub use error::{Error, Result};
pub use frames::{Frame, Transcription};
pub use gate::{HoldState, HoldWakeGate};
pub use idle::{IdleConfig, IdleDecision, IdleMonitor};
pub use session::{Session, SessionEvent, SessionOutput, SessionParams};
pub use summarizer::{RollingSummarizer, SummarizerConfig};
pub use wake::WakeMatcher;
