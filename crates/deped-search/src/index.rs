//! In-memory document index with snapshot-swap reloads.
//!
//! A reload builds a complete [`IndexSnapshot`] without holding any lock and
//! then replaces the current `Arc` in one write. Readers clone the `Arc` and
//! score against it lock-free, so they always see either the old or the new
//! snapshot in full.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use crate::types::IndexedDocument;
use deped_core::Result;
use deped_store::{DocumentSource, StoredDocument};

/// An immutable set of indexed documents from one reload.
#[derive(Debug)]
pub struct IndexSnapshot {
    documents: Vec<Arc<IndexedDocument>>,
    by_id: HashMap<i64, usize>,
    generation: u64,
    loaded_at: DateTime<Utc>,
}

impl IndexSnapshot {
    /// Freeze `records` in the order given. Unindexable records are skipped.
    pub fn build(records: impl IntoIterator<Item = StoredDocument>, generation: u64) -> Self {
        let mut documents = Vec::new();
        let mut by_id = HashMap::new();

        for record in records {
            let id = record.id;
            match IndexedDocument::from_stored(record) {
                Some(doc) => {
                    by_id.entry(id).or_insert(documents.len());
                    documents.push(Arc::new(doc));
                }
                None => warn!("Skipping document {} with empty title or text", id),
            }
        }

        Self {
            documents,
            by_id,
            generation,
            loaded_at: Utc::now(),
        }
    }

    /// Every document, in scan order.
    pub fn all(&self) -> &[Arc<IndexedDocument>] {
        &self.documents
    }

    pub fn get(&self, id: i64) -> Option<&Arc<IndexedDocument>> {
        self.by_id.get(&id).map(|&i| &self.documents[i])
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of successful reloads that produced this snapshot (first load is 1).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

/// Holder of the current snapshot.
#[derive(Default)]
pub struct DocumentIndex {
    current: RwLock<Option<Arc<IndexSnapshot>>>,
    reload_lock: Mutex<()>,
}

impl DocumentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot, `None` until the first successful reload.
    pub fn snapshot(&self) -> Option<Arc<IndexSnapshot>> {
        self.current.read().clone()
    }

    /// Rebuild from `source` and swap the result in.
    ///
    /// On error the previous snapshot stays in place.
    pub fn reload(&self, source: &dyn DocumentSource) -> Result<Arc<IndexSnapshot>> {
        let _serial = self.reload_lock.lock();
        self.rebuild(source)
    }

    /// Current snapshot, loading it from `source` only if none exists yet.
    ///
    /// Callers racing on an empty index wait for the first load and share
    /// its result instead of each reading the store.
    pub fn load_if_empty(&self, source: &dyn DocumentSource) -> Result<Arc<IndexSnapshot>> {
        if let Some(snapshot) = self.snapshot() {
            return Ok(snapshot);
        }
        let _serial = self.reload_lock.lock();
        if let Some(snapshot) = self.snapshot() {
            return Ok(snapshot);
        }
        self.rebuild(source)
    }

    /// Caller must hold `reload_lock`.
    fn rebuild(&self, source: &dyn DocumentSource) -> Result<Arc<IndexSnapshot>> {
        let records = source.active_documents()?;
        let generation = self
            .snapshot()
            .map(|s| s.generation() + 1)
            .unwrap_or(1);
        let snapshot = Arc::new(IndexSnapshot::build(records, generation));

        *self.current.write() = Some(snapshot.clone());

        info!(
            "Loaded {} documents into index (generation {})",
            snapshot.len(),
            generation
        );
        Ok(snapshot)
    }
}
