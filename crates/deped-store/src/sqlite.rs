//! SQLite-backed document store.
//!
//! Holds issuances whose text has already been extracted upstream. The
//! in-memory index reads from it through [`DocumentSource`]; writes go
//! through the ingest pipeline and the admin routes.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::schema::SCHEMA_SQL;
use crate::source::DocumentSource;
use crate::types::*;
use deped_core::{Error, Result};

/// SQLite document store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open or create the SQLite store.
    ///
    /// `db_dir` is the directory (e.g., `data/db/`). The file will be `db_dir/documents.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir)?;
        let db_path = db_dir.join("documents.db");

        let conn = Self::create_connection(&db_path)?;
        Self::init_schema(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };

        info!(
            "SqliteStore initialized: {} documents, path={}",
            store.count_documents()?,
            store.db_path.display()
        );

        Ok(store)
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(conn)
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;
        Ok(())
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    // ---------------------------------------------------------------
    // Document CRUD
    // ---------------------------------------------------------------

    /// Insert a document. Returns the new document ID.
    pub fn add_document(&self, doc: &NewDocument, opts: AddDocumentOptions) -> Result<i64> {
        let now = opts.created_at.unwrap_or_else(now_millis);
        let tags_json = serde_json::to_string(&doc.tags)?;
        let meta_json = opts.metadata.as_ref().map(serde_json::to_string).transpose()?;

        let conn = self.conn.lock();
        let id = conn
            .prepare_cached(
                "INSERT INTO documents (title, text, tags_json, document_type, status, metadata_json, content_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4, 'active', ?5, ?6, ?7)",
            )
            .map_err(|e| Error::Database(e.to_string()))?
            .insert(params![
                doc.title,
                doc.text,
                tags_json,
                doc.document_type.as_str(),
                meta_json,
                opts.content_hash,
                now
            ])
            .map_err(|e| {
                if e.to_string().contains("UNIQUE constraint") {
                    Error::DuplicateContent(opts.content_hash.clone().unwrap_or_default())
                } else {
                    Error::Database(e.to_string())
                }
            })?;
        Ok(id)
    }

    /// Find a document by content hash.
    pub fn find_document_by_hash(&self, content_hash: &str) -> Result<Option<StoredDocument>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM documents WHERE content_hash = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![content_hash], Self::row_to_document)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }

    /// Get a document by ID.
    pub fn get_document(&self, doc_id: i64) -> Result<Option<StoredDocument>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM documents WHERE id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![doc_id], Self::row_to_document)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }

    /// List documents, optionally filtered by status, newest first.
    pub fn list_documents(&self, status: Option<DocumentStatus>) -> Result<Vec<StoredDocument>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT * FROM documents WHERE (?1 IS NULL OR status = ?1) ORDER BY created_at DESC, id DESC",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![status.map(|s| s.as_str())], Self::row_to_document)
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Database(e.to_string()))
    }

    /// Mark a document archived so the next reload drops it from the index.
    pub fn archive_document(&self, doc_id: i64) -> Result<bool> {
        self.set_status(doc_id, DocumentStatus::Archived)
    }

    pub fn set_status(&self, doc_id: i64, status: DocumentStatus) -> Result<bool> {
        let conn = self.conn.lock();
        let count = conn
            .execute(
                "UPDATE documents SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.as_str(), now_millis(), doc_id],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Count total documents.
    pub fn count_documents(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count)
    }

    // ---------------------------------------------------------------
    // Stats
    // ---------------------------------------------------------------

    /// Get store statistics.
    pub fn get_stats(&self) -> Result<StoreStats> {
        let total_documents = self.count_documents()?;

        let conn = self.conn.lock();
        let active_documents: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM documents WHERE status = 'active'",
                [],
                |row| row.get(0),
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare_cached(
                "SELECT document_type, COUNT(*) FROM documents GROUP BY document_type ORDER BY document_type",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let documents_by_type: Vec<TypeCount> = stmt
            .query_map([], |row| {
                let raw: String = row.get(0)?;
                Ok(TypeCount {
                    document_type: raw.parse().unwrap_or_default(),
                    count: row.get(1)?,
                })
            })
            .map_err(|e| Error::Database(e.to_string()))?
            .collect::<rusqlite::Result<_>>()
            .map_err(|e| Error::Database(e.to_string()))?;
        drop(stmt);
        drop(conn);

        let db_size = std::fs::metadata(&self.db_path)
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(StoreStats {
            total_documents,
            active_documents,
            documents_by_type,
            db_path: self.db_path.to_string_lossy().to_string(),
            db_size_mb: db_size as f64 / (1024.0 * 1024.0),
        })
    }

    // ---------------------------------------------------------------
    // Row Mapping Helpers
    // ---------------------------------------------------------------

    /// Required columns fail the row; malformed JSON or enum text falls back
    /// to defaults.
    fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredDocument> {
        Ok(StoredDocument {
            id: row.get("id")?,
            title: row.get("title")?,
            text: row.get("text")?,
            tags: row
                .get::<_, String>("tags_json")
                .ok()
                .and_then(|s| serde_json::from_str(&s).ok())
                .unwrap_or_default(),
            document_type: row
                .get::<_, String>("document_type")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            status: row
                .get::<_, String>("status")
                .map(|s| DocumentStatus::from_column(&s))
                .unwrap_or_default(),
            metadata: row
                .get::<_, Option<String>>("metadata_json")
                .ok()
                .flatten()
                .and_then(|s| serde_json::from_str(&s).ok()),
            content_hash: row.get("content_hash").ok().flatten(),
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at").ok().flatten(),
        })
    }
}

impl DocumentSource for SqliteStore {
    fn active_documents(&self) -> Result<Vec<StoredDocument>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT * FROM documents WHERE status = 'active' ORDER BY id ASC")
            .map_err(|e| Error::SourceUnavailable(e.to_string()))?;
        let rows = stmt
            .query_map([], Self::row_to_document)
            .map_err(|e| Error::SourceUnavailable(e.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::SourceUnavailable(e.to_string()))
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (SqliteStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn new_doc(title: &str, text: &str) -> NewDocument {
        NewDocument {
            title: title.into(),
            text: text.into(),
            tags: vec!["enrollment".into(), "basic education".into()],
            document_type: DocumentType::Guidelines,
        }
    }

    #[test]
    fn test_add_and_get_document() {
        let (store, _dir) = test_store();

        let doc_id = store
            .add_document(
                &new_doc("Enrollment Guidelines 2024", "Enrollment procedures begin in June."),
                AddDocumentOptions {
                    content_hash: Some("hash123".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let doc = store.get_document(doc_id).unwrap().unwrap();
        assert_eq!(doc.title, "Enrollment Guidelines 2024");
        assert_eq!(doc.text, "Enrollment procedures begin in June.");
        assert_eq!(doc.tags, vec!["enrollment", "basic education"]);
        assert_eq!(doc.document_type, DocumentType::Guidelines);
        assert_eq!(doc.status, DocumentStatus::Active);
        assert_eq!(doc.content_hash.as_deref(), Some("hash123"));
    }

    #[test]
    fn test_duplicate_content_hash() {
        let (store, _dir) = test_store();

        store
            .add_document(
                &new_doc("First", "Same text"),
                AddDocumentOptions {
                    content_hash: Some("dup_hash".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let result = store.add_document(
            &new_doc("Second", "Same text"),
            AddDocumentOptions {
                content_hash: Some("dup_hash".into()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(Error::DuplicateContent(_))));
    }

    #[test]
    fn test_active_documents_skip_archived() {
        let (store, _dir) = test_store();

        let keep = store
            .add_document(&new_doc("Keep", "Kept text"), Default::default())
            .unwrap();
        let drop_id = store
            .add_document(&new_doc("Drop", "Dropped text"), Default::default())
            .unwrap();

        assert!(store.archive_document(drop_id).unwrap());
        assert!(!store.archive_document(9999).unwrap());

        let active = store.active_documents().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, keep);

        let archived = store.list_documents(Some(DocumentStatus::Archived)).unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].id, drop_id);
        assert_eq!(store.list_documents(None).unwrap().len(), 2);
    }

    #[test]
    fn test_active_documents_in_insertion_order() {
        let (store, _dir) = test_store();
        for title in ["A", "B", "C"] {
            store
                .add_document(&new_doc(title, &format!("{} text", title)), Default::default())
                .unwrap();
        }
        let titles: Vec<String> = store
            .active_documents()
            .unwrap()
            .into_iter()
            .map(|d| d.title)
            .collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_metadata_round_trips_as_json() {
        let (store, _dir) = test_store();
        let id = store
            .add_document(
                &new_doc("Order", "DO_s2024_020"),
                AddDocumentOptions {
                    metadata: Some(serde_json::json!({"documentNumber": "DO_s2024_020"})),
                    ..Default::default()
                },
            )
            .unwrap();
        let doc = store.get_document(id).unwrap().unwrap();
        assert_eq!(
            doc.metadata_map().get("documentNumber"),
            Some(&serde_json::json!("DO_s2024_020"))
        );
    }

    #[test]
    fn test_unreadable_row_fails_the_scan() {
        let (store, _dir) = test_store();
        store
            .add_document(&new_doc("Readable", "Fine text"), Default::default())
            .unwrap();

        // A BLOB title cannot be read back as a String.
        let raw = Connection::open(store.db_path()).unwrap();
        raw.execute(
            "INSERT INTO documents (title, text, created_at) VALUES (x'00ff', 'text', 0)",
            [],
        )
        .unwrap();
        drop(raw);

        assert!(matches!(
            store.active_documents(),
            Err(Error::SourceUnavailable(_))
        ));
        assert!(matches!(store.list_documents(None), Err(Error::Database(_))));
        assert_eq!(store.count_documents().unwrap(), 2);
    }

    #[test]
    fn test_stats() {
        let (store, _dir) = test_store();
        store
            .add_document(&new_doc("One", "First"), Default::default())
            .unwrap();
        let policy = NewDocument {
            document_type: DocumentType::Policy,
            ..new_doc("Two", "Second")
        };
        let id = store.add_document(&policy, Default::default()).unwrap();
        store.archive_document(id).unwrap();

        let stats = store.get_stats().unwrap();
        assert_eq!(stats.total_documents, 2);
        assert_eq!(stats.active_documents, 1);
        assert_eq!(stats.documents_by_type.len(), 2);
        assert!(stats.db_path.ends_with("documents.db"));
    }
}
