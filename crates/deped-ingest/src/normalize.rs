//! Canonical search form for document bodies and queries.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static CRLF: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n?").unwrap());
static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static HORIZONTAL_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]{2,}").unwrap());

/// Lowercase, replace punctuation with spaces, collapse whitespace, trim.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, " ");
    WHITESPACE_RUN.replace_all(&stripped, " ").trim().to_string()
}

/// Tidy text coming out of an upstream extractor before it is stored.
///
/// Line breaks survive (the metadata patterns are line oriented); runs of
/// blank lines shrink to one and runs of horizontal whitespace to one space.
pub fn clean_extracted_text(text: &str) -> String {
    let unix = CRLF.replace_all(text, "\n");
    let squeezed = EXCESS_NEWLINES.replace_all(&unix, "\n\n");
    HORIZONTAL_RUN
        .replace_all(&squeezed, " ")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
