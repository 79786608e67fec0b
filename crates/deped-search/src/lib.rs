//! DepEd search: in-memory index, token scoring, excerpts and answer synthesis.
//!
//! [`Assistant`] is the entry point. It owns a [`DocumentIndex`] loaded from a
//! [`deped_store::DocumentSource`] and turns a free-text question into a
//! [`Response`].

pub mod answer;
pub mod excerpt;
pub mod index;
pub mod scorer;
pub mod types;

pub use answer::Assistant;
pub use excerpt::excerpt;
pub use index::{DocumentIndex, IndexSnapshot};
pub use scorer::{excerpt_words, rank, score, significant_tokens, QueryTerms};
pub use types::*;
