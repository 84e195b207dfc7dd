//! Classification result.

/// Why a text was flagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Which field matched (`user_name` or `content`)
    pub field: &'static str,
    /// The listed word that matched, lowercased
    pub word: String,
}
