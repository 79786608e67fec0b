//! DepEd ingest: text normalization, issuance metadata extraction, document ingestion.

pub mod file;
pub mod ingest;
pub mod metadata;
pub mod normalize;

pub use ingest::{content_hash, parse_tags, IngestOutcome, Ingester};
pub use metadata::{extract_metadata, ExtractedMetadata};
pub use normalize::{clean_extracted_text, normalize};
