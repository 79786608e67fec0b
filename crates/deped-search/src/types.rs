//! Indexed documents, ranked results, and the answer envelope.

use std::sync::Arc;

use deped_ingest::{extract_metadata, normalize, ExtractedMetadata};
use deped_store::{DocumentType, StoredDocument};
use serde::ser::{Serialize, Serializer};

/// A document frozen into the in-memory index.
///
/// Built once from a [`StoredDocument`]; the normalized fields are always
/// derived from `text` and never edited afterwards.
#[derive(Debug, Clone)]
pub struct IndexedDocument {
    id: i64,
    title: String,
    tags: Vec<String>,
    document_type: DocumentType,
    text: String,
    normalized_title: String,
    normalized_body: String,
    normalized_tags: String,
    metadata: ExtractedMetadata,
}

impl IndexedDocument {
    /// Freeze a stored record. Records without a title or text are not indexable.
    pub fn from_stored(doc: StoredDocument) -> Option<Self> {
        if doc.title.trim().is_empty() || doc.text.trim().is_empty() {
            return None;
        }
        let normalized_tags = normalize(&doc.tags.join(" "));
        Some(Self {
            id: doc.id,
            normalized_title: normalize(&doc.title),
            normalized_body: normalize(&doc.text),
            normalized_tags,
            metadata: extract_metadata(&doc.text),
            title: doc.title,
            tags: doc.tags,
            document_type: doc.document_type,
            text: doc.text,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    /// Raw, case-preserving text used for excerpts.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn normalized_body(&self) -> &str {
        &self.normalized_body
    }

    pub fn metadata(&self) -> &ExtractedMetadata {
        &self.metadata
    }

    /// Whether `token` occurs as a substring of the searchable text.
    ///
    /// Tokens never contain whitespace, so testing each part on its own is
    /// the same as testing the space-joined concatenation. `body_limit`
    /// bounds how many body characters are considered.
    pub fn contains_token(&self, token: &str, body_limit: Option<usize>) -> bool {
        self.normalized_title.contains(token)
            || self.normalized_tags.contains(token)
            || self.body_prefix(body_limit).contains(token)
    }

    pub(crate) fn body_prefix(&self, limit: Option<usize>) -> &str {
        match limit {
            None => &self.normalized_body,
            Some(n) => match self.normalized_body.char_indices().nth(n) {
                Some((byte, _)) => &self.normalized_body[..byte],
                None => &self.normalized_body,
            },
        }
    }
}

/// One ranked hit.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub document: Arc<IndexedDocument>,
    /// Fraction of significant query tokens found, in `[0, 1]`.
    pub relevance: f64,
    pub excerpt: String,
}

impl QueryResult {
    pub fn title(&self) -> &str {
        self.document.title()
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceView<'a> {
    id: i64,
    title: &'a str,
    document_type: DocumentType,
    tags: &'a [String],
    relevance: f64,
    excerpt: &'a str,
    metadata: &'a ExtractedMetadata,
}

impl Serialize for QueryResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SourceView {
            id: self.document.id(),
            title: self.document.title(),
            document_type: self.document.document_type(),
            tags: self.document.tags(),
            relevance: self.relevance,
            excerpt: &self.excerpt,
            metadata: self.document.metadata(),
        }
        .serialize(serializer)
    }
}

/// Outcome of a single query. Every variant must be handled by the caller.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Success {
        message: String,
        sources: Vec<QueryResult>,
        #[serde(rename = "followUp")]
        follow_up: Vec<String>,
    },
    NoResults {
        message: String,
        suggestions: Vec<String>,
    },
    Invalid {
        message: String,
        suggestions: Vec<String>,
    },
    Error {
        message: String,
        sources: Vec<QueryResult>,
    },
}

impl Response {
    /// The serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::NoResults { .. } => "no_results",
            Self::Invalid { .. } => "invalid",
            Self::Error { .. } => "error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. }
            | Self::NoResults { message, .. }
            | Self::Invalid { message, .. }
            | Self::Error { message, .. } => message,
        }
    }

    /// Ranked sources; empty for every variant but `Success`.
    pub fn sources(&self) -> &[QueryResult] {
        match self {
            Self::Success { sources, .. } | Self::Error { sources, .. } => sources.as_slice(),
            Self::NoResults { .. } | Self::Invalid { .. } => &[],
        }
    }
}
