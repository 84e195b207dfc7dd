//! # Outbound Ports (Driven Ports)

/// Decides whether a piece of text is acceptable.
pub trait ModerationClassifier: Send + Sync {
    /// The first disallowed word found in `text`, if any.
    fn offending_word(&self, text: &str) -> Option<String>;

    fn is_offensive(&self, text: &str) -> bool {
        self.offending_word(text).is_some()
    }
}
