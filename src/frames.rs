//! Pipeline frames
//!
//! Events flowing through a session's processing chain. The hold/wake gate
//! filters these; everything else consumes them from the session loop.

/// A unit of recognized speech attributed to one user turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcription {
    pub text: String,
}

impl Transcription {
    /// Build a transcription frame
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// An event in the session's inbound processing stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Recognized speech text
    Transcript(Transcription),
    /// Raw audio passing through untranscribed
    Audio(Vec<u8>),
    /// Directive to speak a fixed line, bypassing the model
    Speak(String),
    /// Session should wind down once queued speech finishes
    End,
}

impl Frame {
    /// Shorthand for a transcript frame
    #[must_use]
    pub fn transcript(text: impl Into<String>) -> Self {
        Self::Transcript(Transcription::new(text))
    }
}
