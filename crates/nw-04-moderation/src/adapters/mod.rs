//! Adapters for the moderation ports.

pub mod word_list;

pub use word_list::WordListClassifier;
