//! Parsing the validator model's free-text answer.

use super::ValidationStatus;

/// Maps a model response onto a status by literal marker matching.
///
/// Pass markers win over fail markers; a response with neither is
/// `NeedsReview`, never an error.
#[must_use]
pub fn classify_verdict(response: &str) -> ValidationStatus {
    let lower = response.to_lowercase();
    if lower.contains("status: pass") || response.contains('✅') {
        ValidationStatus::Pass
    } else if lower.contains("status: fail") || response.contains('❌') {
        ValidationStatus::Fail
    } else {
        ValidationStatus::NeedsReview
    }
}

/// First `limit` characters of `text`, with `...` appended when cut.
#[must_use]
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((at, _)) => format!("{}...", &text[..at]),
        None => text.to_string(),
    }
}

/// Bullet items under the first heading that starts with "recommendation".
///
/// Blank lines inside the list are skipped; the first non-bullet line after
/// the heading ends it.
#[must_use]
pub fn extract_recommendations(response: &str) -> Vec<String> {
    let mut lines = response.lines();
    if !lines.any(is_recommendations_heading) {
        return Vec::new();
    }

    let mut items = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match bullet_text(line) {
            Some(item) if !item.is_empty() => items.push(item.to_string()),
            Some(_) => {}
            None => break,
        }
    }
    items
}

fn is_recommendations_heading(line: &str) -> bool {
    let cleaned = line
        .trim()
        .trim_start_matches('#')
        .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.')
        .trim()
        .trim_matches('*')
        .trim();
    cleaned.to_lowercase().starts_with("recommendation")
}

fn bullet_text(line: &str) -> Option<&str> {
    for marker in ["- ", "* ", "+ ", "• "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(rest.trim());
        }
    }
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return Some(rest.trim());
        }
    }
    None
}
