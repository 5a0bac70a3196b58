//! Hold/wake gate
//!
//! A stateful stream filter sitting between STT and the conversation
//! context. While on hold it silently drops every transcript except those
//! containing a wake phrase; the matching transcript ends hold and is
//! forwarded so the conversation responds to the wake utterance itself.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::frames::Frame;
use crate::wake::WakeMatcher;

/// Shared hold flag for one session.
///
/// Set true only by the hold tool, set false only by wake detection; both
/// writers run on the session's event loop, so loop ordering is the only
/// synchronization needed.
#[derive(Clone, Default)]
pub struct HoldState {
    on_hold: Arc<AtomicBool>,
}

impl HoldState {
    /// Create a fresh, not-on-hold state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the session is currently on hold
    #[must_use]
    pub fn is_on_hold(&self) -> bool {
        self.on_hold.load(Ordering::SeqCst)
    }

    /// Engage or release hold
    pub fn set(&self, on_hold: bool) {
        self.on_hold.store(on_hold, Ordering::SeqCst);
        if on_hold {
            tracing::info!("hold engaged - waiting for wake phrase");
        } else {
            tracing::info!("hold released - resuming conversation");
        }
    }
}

/// Stream filter implementing the hold/wake state machine
pub struct HoldWakeGate {
    state: HoldState,
    matcher: WakeMatcher,
}

impl HoldWakeGate {
    /// Create a gate with a fresh hold state
    #[must_use]
    pub fn new(matcher: WakeMatcher) -> Self {
        Self::with_state(matcher, HoldState::new())
    }

    /// Create a gate around an existing shared hold state
    #[must_use]
    pub fn with_state(matcher: WakeMatcher, state: HoldState) -> Self {
        Self { state, matcher }
    }

    /// A clone of the shared hold state handle
    #[must_use]
    pub fn state(&self) -> HoldState {
        self.state.clone()
    }

    /// Whether the gate is currently holding
    #[must_use]
    pub fn is_on_hold(&self) -> bool {
        self.state.is_on_hold()
    }

    /// Filter one inbound frame.
    ///
    /// Returns the frame to forward downstream, or `None` when a transcript
    /// is dropped while on hold. Non-transcript frames always pass.
    pub fn process(&mut self, frame: Frame) -> Option<Frame> {
        if !self.state.is_on_hold() {
            return Some(frame);
        }

        match frame {
            Frame::Transcript(transcription) => {
                if self.matcher.matches(&transcription.text) {
                    tracing::info!(transcript = %transcription.text, "wake phrase detected");
                    self.state.set(false);
                    Some(Frame::Transcript(transcription))
                } else {
                    tracing::debug!(transcript = %transcription.text, "dropped while on hold");
                    None
                }
            }
            other => Some(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::DEFAULT_WAKE_PHRASES;

    fn gate() -> HoldWakeGate {
        let matcher = WakeMatcher::new(DEFAULT_WAKE_PHRASES.iter().copied()).expect("phrases");
        HoldWakeGate::new(matcher)
    }

    #[test]
    fn starts_active_and_forwards_everything() {
        let mut gate = gate();
        assert!(!gate.is_on_hold());

        let frame = Frame::transcript("I am thinking");
        assert_eq!(gate.process(frame.clone()), Some(frame));
        assert_eq!(
            gate.process(Frame::Audio(vec![1, 2, 3])),
            Some(Frame::Audio(vec![1, 2, 3]))
        );
    }

    #[test]
    fn hold_drops_non_wake_transcripts() {
        let mut gate = gate();
        gate.state().set(true);

        assert_eq!(gate.process(Frame::transcript("I am thinking")), None);
        assert_eq!(gate.process(Frame::transcript("what's the weather")), None);
        assert!(gate.is_on_hold());
    }

    #[test]
    fn wake_phrase_releases_hold_and_forwards() {
        let mut gate = gate();
        gate.state().set(true);

        let forwarded = gate.process(Frame::transcript("okay I'm back"));
        assert_eq!(forwarded, Some(Frame::transcript("okay I'm back")));
        assert!(!gate.is_on_hold());

        // Fully active again afterwards
        let frame = Frame::transcript("anything at all");
        assert_eq!(gate.process(frame.clone()), Some(frame));
    }

    #[test]
    fn non_transcript_frames_pass_while_on_hold() {
        let mut gate = gate();
        gate.state().set(true);

        assert_eq!(
            gate.process(Frame::Audio(vec![9])),
            Some(Frame::Audio(vec![9]))
        );
        assert_eq!(
            gate.process(Frame::Speak("hi".to_string())),
            Some(Frame::Speak("hi".to_string()))
        );
        assert_eq!(gate.process(Frame::End), Some(Frame::End));
        assert!(gate.is_on_hold());
    }
}
