//! Heuristic DepEd issuance metadata: document number, subject, date, issuing office.
//!
//! Each field is an independent regex search over the original text. First
//! match wins and a missing field is normal.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static DOCUMENT_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(DO_s\d{4}_\d{3}|DM_s\d{4}_\d{3}|DepEd Order No\. \d+)").unwrap()
});
static SUBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)SUBJECT:\s*(.+)").unwrap());
static DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:Date|Dated):\s*([A-Za-z]+\s+\d{1,2},\s+\d{4})").unwrap()
});
static FROM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)FROM:\s*(.+?)(?:\n|TO:|$)").unwrap());

/// Structured fields pulled out of an issuance's text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedMetadata {
    pub document_number: Option<String>,
    pub subject: Option<String>,
    pub date: Option<String>,
    /// Issuing office (the `FROM:` line).
    pub from: Option<String>,
}

impl ExtractedMetadata {
    pub fn is_empty(&self) -> bool {
        self.document_number.is_none()
            && self.subject.is_none()
            && self.date.is_none()
            && self.from.is_none()
    }
}

/// Run all four pattern searches over `text`.
pub fn extract_metadata(text: &str) -> ExtractedMetadata {
    ExtractedMetadata {
        document_number: DOCUMENT_NUMBER
            .find(text)
            .map(|m| m.as_str().to_string()),
        subject: first_capture(&SUBJECT, text),
        date: first_capture(&DATE, text),
        from: first_capture(&FROM, text),
    }
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}
