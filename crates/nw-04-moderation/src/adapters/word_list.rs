//! Word list classifier.
//!
//! Loaded from `{"offensive_words": ["..."]}`. A text is offensive when it
//! contains any listed word as a case-insensitive substring.

use crate::domain::ModerationError;
use crate::ports::ModerationClassifier;
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
struct WordListFile {
    #[serde(default)]
    offensive_words: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct WordListClassifier {
    /// Lowercased, blank entries removed
    words: Vec<String>,
}

impl WordListClassifier {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        // A blank entry would match every text
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    pub fn from_json(raw: &str) -> Result<Self, ModerationError> {
        let file: WordListFile =
            serde_json::from_str(raw).map_err(|e| ModerationError::WordList(e.to_string()))?;
        Ok(Self::new(file.offensive_words))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModerationError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ModerationError::WordList(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl ModerationClassifier for WordListClassifier {
    fn offending_word(&self, text: &str) -> Option<String> {
        let text = text.to_lowercase();
        self.words.iter().find(|w| text.contains(w.as_str())).cloned()
    }
}
