//! Wake phrase matching
//!
//! Case-insensitive, whole-word matching of configured wake phrases inside
//! free transcript text. Patterns are compiled once at construction.

use regex::RegexSetBuilder;

use crate::{Error, Result};

/// Matches transcript text against a fixed set of wake phrases
pub struct WakeMatcher {
    phrases: Vec<String>,
    patterns: regex::RegexSet,
}

impl WakeMatcher {
    /// Compile a matcher from an ordered list of phrases.
    ///
    /// Each phrase becomes a word-boundary-anchored, case-insensitive
    /// pattern, so `"samora"` matches `"hey samora!"` but not `"samorax"`.
    ///
    /// # Errors
    ///
    /// Returns error if a phrase is empty or a pattern fails to compile.
    pub fn new<I, S>(phrases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let phrases: Vec<String> = phrases.into_iter().map(Into::into).collect();

        let mut sources = Vec::with_capacity(phrases.len());
        for phrase in &phrases {
            if phrase.trim().is_empty() {
                return Err(Error::Wake("wake phrase must not be empty".to_string()));
            }
            sources.push(format!(r"\b{}\b", regex::escape(phrase)));
        }

        let patterns = RegexSetBuilder::new(&sources)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::Wake(e.to_string()))?;

        Ok(Self { phrases, patterns })
    }

    /// Whether any configured phrase occurs in `text` as a whole word
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        !text.is_empty() && self.patterns.is_match(text)
    }

    /// The configured phrases, in construction order
    #[must_use]
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(phrases: &[&str]) -> WakeMatcher {
        WakeMatcher::new(phrases.iter().copied()).expect("valid phrases")
    }

    #[test]
    fn matches_whole_words_only() {
        let m = matcher(&["samora"]);
        assert!(m.matches("hey samora!"));
        assert!(m.matches("SAMORA are you there"));
        assert!(!m.matches("samorax"));
        assert!(!m.matches("unsamora"));
    }

    #[test]
    fn matches_multi_word_phrases() {
        let m = matcher(&["i'm back", "let's continue"]);
        assert!(m.matches("okay I'm back now"));
        assert!(m.matches("alright, let's continue"));
        assert!(!m.matches("backing up"));
    }

    #[test]
    fn empty_text_never_matches() {
        let m = matcher(&["hello"]);
        assert!(!m.matches(""));
    }

    #[test]
    fn overlapping_phrases_both_match() {
        let m = matcher(&["hello", "hello there"]);
        assert!(m.matches("hello"));
        assert!(m.matches("well hello there friend"));
    }

    #[test]
    fn empty_phrase_rejected() {
        assert!(WakeMatcher::new(["hello", ""]).is_err());
        assert!(WakeMatcher::new(["   "]).is_err());
    }

    #[test]
    fn literal_punctuation_is_escaped() {
        let m = matcher(&["a.b"]);
        assert!(m.matches("say a.b now"));
        assert!(!m.matches("say aXb now"));
    }
}
