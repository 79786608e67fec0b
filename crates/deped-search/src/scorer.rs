//! Bag-of-tokens relevance scoring.
//!
//! A document's relevance is the fraction of significant query tokens that
//! appear as substrings of its searchable text. No stemming, no term
//! weighting: "polic" matches "policy".

use std::sync::Arc;

use deped_core::SearchSettings;
use deped_ingest::normalize;

use crate::excerpt::excerpt;
use crate::index::IndexSnapshot;
use crate::types::{IndexedDocument, QueryResult};

/// Normalize `query` and keep distinct tokens of at least `min_chars` characters,
/// in first-seen order.
pub fn significant_tokens(query: &str, min_chars: usize) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for token in normalize(query).split_whitespace() {
        if token.chars().count() >= min_chars && !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
    }
    tokens
}

/// Terms used to pick excerpts: lowercase whitespace-separated words of
/// `query` with punctuation kept (`"k-12"` stays whole), then any normalized
/// token not already present (`"policy?"` also yields `"policy"`).
pub fn excerpt_words(query: &str, min_chars: usize) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    let raw = query.to_lowercase();
    let normalized = significant_tokens(query, min_chars);
    for word in raw.split_whitespace().chain(normalized.iter().map(String::as_str)) {
        if word.chars().count() >= min_chars && !words.iter().any(|w| w == word) {
            words.push(word.to_string());
        }
    }
    words
}

/// A query split two ways: normalized tokens for scoring, raw words for excerpts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryTerms {
    pub tokens: Vec<String>,
    pub excerpt_words: Vec<String>,
}

impl QueryTerms {
    pub fn parse(query: &str, min_chars: usize) -> Self {
        Self {
            tokens: significant_tokens(query, min_chars),
            excerpt_words: excerpt_words(query, min_chars),
        }
    }
}

/// Score and rank `query` against `snapshot`.
pub fn score(query: &str, snapshot: &IndexSnapshot, settings: &SearchSettings) -> Vec<QueryResult> {
    let terms = QueryTerms::parse(query, settings.min_token_chars);
    rank(&terms, snapshot, settings)
}

/// Rank documents for already-parsed query terms.
///
/// Zero-match documents are dropped, ties keep scan order, and at most
/// `settings.max_results` results come back, each with its excerpt.
pub fn rank(
    terms: &QueryTerms,
    snapshot: &IndexSnapshot,
    settings: &SearchSettings,
) -> Vec<QueryResult> {
    let tokens = &terms.tokens;
    if tokens.is_empty() {
        return Vec::new();
    }

    let total = tokens.len() as f64;
    let mut scored: Vec<(&Arc<IndexedDocument>, f64)> = snapshot
        .all()
        .iter()
        .filter_map(|doc| {
            let matched = tokens
                .iter()
                .filter(|t| doc.contains_token(t, settings.max_body_chars))
                .count();
            (matched > 0).then(|| (doc, matched as f64 / total))
        })
        .collect();

    // sort_by is stable: equal relevance keeps index order.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(settings.max_results);

    scored
        .into_iter()
        .map(|(doc, relevance)| QueryResult {
            excerpt: excerpt(doc.text(), &terms.excerpt_words, settings.excerpt_max_chars),
            document: Arc::clone(doc),
            relevance,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use deped_store::{DocumentStatus, DocumentType, StoredDocument};

    fn record(id: i64, title: &str, text: &str, tags: &[&str]) -> StoredDocument {
        StoredDocument {
            id,
            title: title.into(),
            text: text.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            document_type: DocumentType::Other,
            status: DocumentStatus::Active,
            metadata: None,
            content_hash: None,
            created_at: 0,
            updated_at: None,
        }
    }

    fn ids(results: &[QueryResult]) -> Vec<i64> {
        results.iter().map(|r| r.document.id()).collect()
    }

    #[test]
    fn test_significant_tokens_filters_short_and_duplicates() {
        assert_eq!(
            significant_tokens("What is the DepEd policy on the policy?", 3),
            vec!["what", "the", "deped", "policy"]
        );
        assert!(significant_tokens("a an to of", 3).is_empty());
        assert!(significant_tokens("", 3).is_empty());
    }

    #[test]
    fn test_excerpt_words_keep_punctuation() {
        assert_eq!(
            excerpt_words("K-12 Curriculum for the k-12 curriculum", 3),
            vec!["k-12", "curriculum", "for", "the"]
        );
        assert_eq!(excerpt_words("Uniform policy?", 3), vec!["uniform", "policy?", "policy"]);
        assert_eq!(
            QueryTerms::parse("K-12 curriculum", 3).tokens,
            vec!["curriculum"]
        );
    }

    #[test]
    fn test_excerpt_prefers_sentence_with_raw_query_word() {
        let snap = IndexSnapshot::build(
            vec![record(
                1,
                "Curriculum Guide",
                "Curriculum overview. The K-12 curriculum covers thirteen years.",
                &[],
            )],
            1,
        );
        let results = score("K-12 curriculum", &snap, &SearchSettings::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].relevance, 1.0);
        assert_eq!(results[0].excerpt, "The K-12 curriculum covers thirteen years");
    }

    #[test]
    fn test_relevance_is_fraction_of_tokens() {
        let snap = IndexSnapshot::build(
            vec![
                record(1, "Grading Policy", "Learners are graded quarterly.", &[]),
                record(2, "Enrollment", "Enrollment opens in June.", &["grading"]),
            ],
            1,
        );
        let results = score("grading enrollment", &snap, &SearchSettings::default());
        assert_eq!(ids(&results), vec![2, 1]);
        assert_eq!(results[0].relevance, 1.0);
        assert_eq!(results[1].relevance, 0.5);
    }

    #[test]
    fn test_substring_matching_is_not_word_bound() {
        let snap = IndexSnapshot::build(vec![record(1, "Policy", "Anti-bullying policy.", &[])], 1);
        let results = score("polic bully", &snap, &SearchSettings::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].relevance, 1.0);
    }

    #[test]
    fn test_non_matching_documents_are_excluded() {
        let snap = IndexSnapshot::build(
            vec![
                record(1, "Calendar", "School calendar.", &[]),
                record(2, "Uniforms", "Uniform guidelines.", &[]),
            ],
            1,
        );
        let results = score("calendar", &snap, &SearchSettings::default());
        assert_eq!(ids(&results), vec![1]);
    }

    #[test]
    fn test_ties_keep_scan_order() {
        let snap = IndexSnapshot::build(
            vec![
                record(5, "Alpha", "reading program", &[]),
                record(3, "Beta", "reading program", &[]),
                record(9, "Gamma", "reading and math program", &[]),
                record(1, "Delta", "math only", &[]),
            ],
            1,
        );
        let results = score("reading math", &snap, &SearchSettings::default());
        assert_eq!(ids(&results), vec![9, 5, 3, 1]);
    }

    #[test]
    fn test_at_most_max_results() {
        let records: Vec<StoredDocument> = (1..=12)
            .map(|i| record(i, &format!("Memo {}", i), "assessment memo", &[]))
            .collect();
        let snap = IndexSnapshot::build(records, 1);

        let results = score("assessment", &snap, &SearchSettings::default());
        assert_eq!(ids(&results), vec![1, 2, 3, 4, 5]);

        let wide = SearchSettings {
            max_results: 8,
            ..Default::default()
        };
        assert_eq!(score("assessment", &snap, &wide).len(), 8);
    }

    #[test]
    fn test_short_tokens_only_scores_nothing() {
        let snap = IndexSnapshot::build(vec![record(1, "Go to an IT lab", "go to it", &[])], 1);
        assert!(score("go to it", &snap, &SearchSettings::default()).is_empty());
    }

    #[test]
    fn test_body_limit_applies_to_scoring() {
        let snap = IndexSnapshot::build(
            vec![record(1, "Memo", "opening remarks then the actual guidelines", &[])],
            1,
        );
        let bounded = SearchSettings {
            max_body_chars: Some(16),
            ..Default::default()
        };
        assert!(score("guidelines", &snap, &bounded).is_empty());
        assert_eq!(score("remarks", &snap, &bounded).len(), 1);
    }
}
