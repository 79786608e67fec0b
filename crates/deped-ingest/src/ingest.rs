//! Document ingestion pipeline: extracted text → clean → metadata → store.

use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::file;
use crate::metadata::{extract_metadata, ExtractedMetadata};
use crate::normalize::clean_extracted_text;
use deped_core::{Error, Result};
use deped_store::{AddDocumentOptions, DocumentType, NewDocument, SqliteStore};

/// What a successful ingest produced.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub document_id: i64,
    pub metadata: ExtractedMetadata,
}

/// Persists already-extracted documents into the store.
///
/// New documents become searchable after the next index reload.
pub struct Ingester<'a> {
    store: &'a SqliteStore,
}

impl<'a> Ingester<'a> {
    pub fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }

    /// Read a plain-text file and ingest it under the given title.
    pub fn ingest_file(
        &self,
        path: &Path,
        title: &str,
        document_type: DocumentType,
        tags: Vec<String>,
    ) -> Result<IngestOutcome> {
        let text = match file::extract_text(path)? {
            Some(t) if !t.trim().is_empty() => t,
            _ => {
                debug!("No text extracted from {}", path.display());
                return Err(Error::Ingest(format!(
                    "no text could be read from {}",
                    path.display()
                )));
            }
        };

        self.ingest(NewDocument {
            title: title.to_string(),
            text,
            tags,
            document_type,
        })
    }

    /// Validate, clean, deduplicate and store a document.
    pub fn ingest(&self, doc: NewDocument) -> Result<IngestOutcome> {
        let title = doc.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::Validation("Document title is required".into()));
        }

        let text = clean_extracted_text(&doc.text);
        if text.is_empty() {
            return Err(Error::Validation("Document text is required".into()));
        }

        let content_hash = content_hash(&text);
        if self.store.find_document_by_hash(&content_hash)?.is_some() {
            debug!("Duplicate content, skipping: {}", title);
            return Err(Error::DuplicateContent(content_hash));
        }

        let metadata = extract_metadata(&text);
        let stored_meta = serde_json::json!({
            "source": "upload",
            "charCount": text.chars().count(),
            "extracted": metadata,
        });

        let record = NewDocument {
            title,
            text,
            tags: dedup_tags(doc.tags),
            document_type: doc.document_type,
        };

        let document_id = self.store.add_document(
            &record,
            AddDocumentOptions {
                metadata: Some(stored_meta),
                content_hash: Some(content_hash),
                ..Default::default()
            },
        )?;

        info!(
            "Ingested document {} \"{}\" ({}, {} tags)",
            document_id,
            record.title,
            record.document_type,
            record.tags.len()
        );

        Ok(IngestOutcome {
            document_id,
            metadata,
        })
    }
}

/// Split comma-separated tag input, trimming and dropping empty entries.
pub fn parse_tags(input: &str) -> Vec<String> {
    dedup_tags(input.split(',').map(str::to_string).collect())
}

/// Trim tags and drop empties and repeats, keeping first-seen order.
fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Compute SHA-256 content hash.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
