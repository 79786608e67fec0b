//! The read-side contract between the document store and the in-memory index.

use deped_core::Result;

use crate::types::StoredDocument;

/// Anything that can hand over the full set of indexable documents.
///
/// Implementations return `Error::SourceUnavailable` when the backing store
/// cannot be reached, so a reload can keep serving the previous snapshot.
pub trait DocumentSource: Send + Sync {
    /// All documents with `DocumentStatus::Active`, in store order.
    fn active_documents(&self) -> Result<Vec<StoredDocument>>;
}

impl<T: DocumentSource + ?Sized> DocumentSource for std::sync::Arc<T> {
    fn active_documents(&self) -> Result<Vec<StoredDocument>> {
        (**self).active_documents()
    }
}
