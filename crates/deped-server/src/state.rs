//! Shared application state.

use std::sync::Arc;

use deped_core::AssistantConfig;
use deped_search::Assistant;
use deped_store::SqliteStore;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: AssistantConfig,
    pub store: Arc<SqliteStore>,
    pub assistant: Assistant,
}

impl AppState {
    /// Wire the assistant to read from `store`. The index starts empty;
    /// call `assistant.reload()` to populate it.
    pub fn new(config: AssistantConfig, store: Arc<SqliteStore>) -> Self {
        let assistant = Assistant::new(
            store.clone(),
            config.search.clone(),
            config.suggestions.clone(),
        );
        Self {
            config,
            store,
            assistant,
        }
    }
}
