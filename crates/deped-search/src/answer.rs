//! Query handling: validate, search the current snapshot, compose a response.
//!
//! Every failure is absorbed here. Callers get a [`Response`] from
//! [`Assistant::answer`] and a `bool` from [`Assistant::reload`], never an error.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::index::{DocumentIndex, IndexSnapshot};
use crate::scorer::{rank, QueryTerms};
use crate::types::{QueryResult, Response};
use deped_core::{Error, Result, SearchSettings};
use deped_store::DocumentSource;

pub const INVALID_MESSAGE: &str = "Please ask a more specific question (at least 3 characters).";
pub const INVALID_SUGGESTIONS: &[&str] = &["Try asking about DepEd policies", "Ask about procedures"];

pub const NO_RESULTS_MESSAGE: &str = "I couldn't find information about that in the DepEd documents. \
Try using different keywords or ask about policies, procedures, or guidelines.";
pub const NO_RESULTS_SUGGESTIONS: &[&str] = &[
    "Try different keywords",
    "Ask about DepEd policies",
    "Ask about school procedures",
];

pub const FOLLOW_UP_PROMPTS: &[&str] = &[
    "Can you tell me more about this?",
    "Are there any related policies?",
    "What are the requirements?",
];

pub const ERROR_MESSAGE: &str =
    "Something went wrong while processing your question. Please try again.";

/// Titles listed under the primary answer, besides the top result.
const MAX_ALSO_FOUND: usize = 2;

/// Owns the document index and answers queries against it.
///
/// Constructed once by the process entry point and shared behind an `Arc`.
pub struct Assistant {
    source: Arc<dyn DocumentSource>,
    index: DocumentIndex,
    settings: SearchSettings,
    suggestions: Vec<String>,
}

impl Assistant {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        settings: SearchSettings,
        suggestions: Vec<String>,
    ) -> Self {
        Self {
            source,
            index: DocumentIndex::new(),
            settings,
            suggestions,
        }
    }

    /// Rebuild the index from the store. `false` means the previous snapshot is still active.
    pub fn reload(&self) -> bool {
        match self.try_reload() {
            Ok(_) => true,
            Err(e) => {
                warn!("Document reload failed, keeping previous index: {}", e);
                false
            }
        }
    }

    /// Rebuild the index and return the number of indexed documents.
    pub fn try_reload(&self) -> Result<usize> {
        self.index
            .reload(self.source.as_ref())
            .map(|snapshot| snapshot.len())
    }

    /// Answer a free-text question.
    pub fn answer(&self, query: &str) -> Response {
        match self.search(query) {
            Ok(results) => compose_success(results),
            Err(Error::Validation(reason)) => {
                debug!("Invalid query {:?}: {}", query, reason);
                Response::Invalid {
                    message: INVALID_MESSAGE.to_string(),
                    suggestions: to_strings(INVALID_SUGGESTIONS),
                }
            }
            Err(Error::NotFound(_)) => Response::NoResults {
                message: NO_RESULTS_MESSAGE.to_string(),
                suggestions: to_strings(NO_RESULTS_SUGGESTIONS),
            },
            Err(e) => {
                error!("Error handling query {:?}: {}", query, e);
                Response::Error {
                    message: ERROR_MESSAGE.to_string(),
                    sources: Vec::new(),
                }
            }
        }
    }

    /// Static example questions for the UI.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn index(&self) -> &DocumentIndex {
        &self.index
    }

    /// Ranked results, or the error that classifies the query.
    ///
    /// A query that passes the raw length check but has no significant
    /// token (e.g. `"to be"`) is rejected as invalid too.
    pub fn search(&self, query: &str) -> Result<Vec<QueryResult>> {
        if query.chars().count() < self.settings.min_query_chars {
            return Err(Error::Validation(format!(
                "query shorter than {} characters",
                self.settings.min_query_chars
            )));
        }

        let terms = QueryTerms::parse(query, self.settings.min_token_chars);
        if terms.tokens.is_empty() {
            return Err(Error::Validation("query has no significant terms".into()));
        }

        let snapshot = self.current_snapshot()?;
        let results = rank(&terms, &snapshot, &self.settings);
        debug!(
            "Query {:?}: {} tokens, {} hits over {} documents",
            query,
            terms.tokens.len(),
            results.len(),
            snapshot.len()
        );

        if results.is_empty() {
            return Err(Error::NotFound(query.to_string()));
        }
        Ok(results)
    }

    /// The current snapshot, loading it on first use.
    fn current_snapshot(&self) -> Result<Arc<IndexSnapshot>> {
        self.index
            .load_if_empty(self.source.as_ref())
            .map_err(|e| Error::Internal(format!("document index unavailable: {}", e)))
    }
}

fn compose_success(results: Vec<QueryResult>) -> Response {
    let mut message = String::new();

    if let Some(top) = results.first() {
        message.push_str(&format!(
            "Based on the DepEd document \"{}\", here's what I found:\n\n{}\n\n",
            top.title(),
            top.excerpt
        ));
    }

    if results.len() > 1 {
        message.push_str(&format!(
            "I also found relevant information in {} other document(s):\n",
            results.len() - 1
        ));
        for other in results.iter().skip(1).take(MAX_ALSO_FOUND) {
            message.push_str(&format!("• {}\n", other.title()));
        }
    }

    Response::Success {
        message,
        sources: results,
        follow_up: to_strings(FOLLOW_UP_PROMPTS),
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use deped_store::{DocumentStatus, DocumentType, StoredDocument};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    struct FakeSource {
        docs: Mutex<Vec<StoredDocument>>,
        down: AtomicBool,
        loads: AtomicUsize,
        latency: Duration,
    }

    impl FakeSource {
        fn with(docs: Vec<StoredDocument>) -> Arc<Self> {
            Self::slow(docs, Duration::ZERO)
        }

        fn slow(docs: Vec<StoredDocument>, latency: Duration) -> Arc<Self> {
            Arc::new(Self {
                docs: Mutex::new(docs),
                down: AtomicBool::new(false),
                loads: AtomicUsize::new(0),
                latency,
            })
        }
    }

    impl DocumentSource for FakeSource {
        fn active_documents(&self) -> Result<Vec<StoredDocument>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.latency);
            if self.down.load(Ordering::SeqCst) {
                return Err(Error::SourceUnavailable("store offline".into()));
            }
            Ok(self.docs.lock().clone())
        }
    }

    fn record(id: i64, title: &str, text: &str) -> StoredDocument {
        StoredDocument {
            id,
            title: title.into(),
            text: text.into(),
            tags: vec![],
            document_type: DocumentType::Guidelines,
            status: DocumentStatus::Active,
            metadata: None,
            content_hash: None,
            created_at: 0,
            updated_at: None,
        }
    }

    fn assistant(source: Arc<FakeSource>) -> Assistant {
        Assistant::new(source, SearchSettings::default(), vec!["Ask me".into()])
    }

    #[test]
    fn test_success_message_lists_other_titles() {
        let source = FakeSource::with(vec![
            record(1, "Reading Program", "The reading program runs daily. It covers math too."),
            record(2, "Math Camp", "Math camp is in May."),
            record(3, "Reading Month", "Reading month is November."),
            record(4, "Library Hours", "The library supports reading."),
        ]);
        let assistant = assistant(source);

        let response = assistant.answer("reading math");
        let Response::Success { message, sources, follow_up } = response else {
            panic!("expected success");
        };

        assert_eq!(sources.len(), 4);
        assert_eq!(sources[0].title(), "Reading Program");
        assert_eq!(follow_up, to_strings(FOLLOW_UP_PROMPTS));
        assert!(message.starts_with(
            "Based on the DepEd document \"Reading Program\", here's what I found:\n\nThe reading program runs daily\n\n"
        ));
        assert!(message.contains("I also found relevant information in 3 other document(s):\n"));
        assert!(message.contains("• Math Camp\n"));
        assert!(message.contains("• Reading Month\n"));
        assert!(!message.contains("• Library Hours"));
    }

    #[test]
    fn test_single_result_has_no_also_found_section() {
        let assistant = assistant(FakeSource::with(vec![record(1, "Calendar", "School opens in June.")]));
        let response = assistant.answer("calendar");
        assert_eq!(response.kind(), "success");
        assert!(!response.message().contains("also found"));
    }

    #[test]
    fn test_short_query_is_invalid_without_touching_index() {
        let source = FakeSource::with(vec![record(1, "xy", "xy")]);
        let assistant = assistant(source.clone());
        for q in ["", "x", "xy", "é!"] {
            let response = assistant.answer(q);
            assert_eq!(response.kind(), "invalid", "query {:?}", q);
            assert_eq!(response.message(), INVALID_MESSAGE);
        }
        assert_eq!(source.loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_query_without_significant_tokens_is_invalid() {
        let assistant = assistant(FakeSource::with(vec![record(1, "To be", "to be or not")]));
        let response = assistant.answer("to be");
        assert!(matches!(response, Response::Invalid { .. }));
    }

    #[test]
    fn test_no_results() {
        let assistant = assistant(FakeSource::with(vec![record(1, "Calendar", "School opens in June.")]));
        let Response::NoResults { message, suggestions } = assistant.answer("uniform policy") else {
            panic!("expected no_results");
        };
        assert_eq!(message, NO_RESULTS_MESSAGE);
        assert_eq!(suggestions.len(), 3);
    }

    #[test]
    fn test_lazy_first_load() {
        let source = FakeSource::with(vec![record(1, "Calendar", "School opens in June.")]);
        let assistant = assistant(source.clone());
        assert!(assistant.index().snapshot().is_none());

        assert_eq!(assistant.answer("calendar").kind(), "success");
        assert_eq!(assistant.answer("calendar").kind(), "success");
        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_first_queries_share_one_load() {
        let source = FakeSource::slow(
            vec![record(1, "Calendar", "School opens in June.")],
            Duration::from_millis(100),
        );
        let assistant = Arc::new(assistant(source.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let assistant = assistant.clone();
                std::thread::spawn(move || assistant.answer("calendar").kind())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), "success");
        }

        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
        assert_eq!(assistant.index().snapshot().unwrap().generation(), 1);
    }

    #[test]
    fn test_unavailable_index_yields_error_response() {
        let source = FakeSource::with(vec![]);
        source.down.store(true, Ordering::SeqCst);
        let assistant = assistant(source);

        let response = assistant.answer("enrollment");
        let Response::Error { message, sources } = &response else {
            panic!("expected error");
        };
        assert_eq!(message, ERROR_MESSAGE);
        assert!(sources.is_empty());
        assert!(!message.contains("offline"));
    }

    #[test]
    fn test_reload_failure_keeps_serving_last_index() {
        let source = FakeSource::with(vec![record(1, "Calendar", "School opens in June.")]);
        let assistant = assistant(source.clone());
        assert!(assistant.reload());
        let before = serde_json::to_value(assistant.answer("school calendar")).unwrap();

        source.down.store(true, Ordering::SeqCst);
        source.docs.lock().clear();
        assert!(!assistant.reload());

        let after = serde_json::to_value(assistant.answer("school calendar")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_reload_picks_up_new_documents() {
        let source = FakeSource::with(vec![]);
        let assistant = assistant(source.clone());
        assert!(assistant.reload());
        assert_eq!(assistant.answer("calendar").kind(), "no_results");

        source.docs.lock().push(record(1, "Calendar", "School opens in June."));
        assert_eq!(assistant.answer("calendar").kind(), "no_results");
        assert_eq!(assistant.try_reload().unwrap(), 1);
        assert_eq!(assistant.answer("calendar").kind(), "success");
    }

    #[test]
    fn test_suggestions_are_static() {
        let assistant = assistant(FakeSource::with(vec![]));
        assert_eq!(assistant.suggestions(), ["Ask me".to_string()]);
    }
}
