//! Single-sentence preview of why a document matched.

pub const NO_CONTENT: &str = "No content available";

const ELLIPSIS: char = '…';

/// Pick the `.`-delimited sentence of `full_text` containing the most `tokens`.
///
/// `tokens` must already be lowercase. The first sentence wins ties,
/// including when nothing matches. Output is at most `max_chars + 1`
/// characters: longer sentences are cut and end with `…`.
pub fn excerpt(full_text: &str, tokens: &[String], max_chars: usize) -> String {
    if full_text.trim().is_empty() {
        return NO_CONTENT.to_string();
    }

    let mut sentences = full_text.split('.');
    let mut best = sentences.next().unwrap_or_default();
    let mut best_count = count_matches(best, tokens);

    for sentence in sentences {
        let count = count_matches(sentence, tokens);
        if count > best_count {
            best = sentence;
            best_count = count;
        }
    }

    let best = best.trim();
    if best.is_empty() {
        return NO_CONTENT.to_string();
    }

    if best.chars().count() > max_chars {
        let cut: String = best.chars().take(max_chars).collect();
        format!("{}{}", cut.trim_end(), ELLIPSIS)
    } else {
        best.to_string()
    }
}

fn count_matches(sentence: &str, tokens: &[String]) -> usize {
    let lower = sentence.to_lowercase();
    tokens.iter().filter(|t| lower.contains(t.as_str())).count()
}
