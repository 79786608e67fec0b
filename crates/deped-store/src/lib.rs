//! DepEd document store: record types, the `DocumentSource` seam, and a SQLite reference store.

pub mod schema;
pub mod source;
pub mod sqlite;
pub mod types;

pub use source::DocumentSource;
pub use sqlite::SqliteStore;
pub use types::*;
