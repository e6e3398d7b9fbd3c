//! Word list normalization for vocabulary submissions.

use std::collections::HashSet;

/// Split a raw comma- and/or newline-separated field into display words.
///
/// Tokens are trimmed and empty ones dropped. A word that differs only in
/// case from an earlier one is discarded; the first occurrence keeps its
/// casing and position.
pub fn normalize_words(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter(|token| seen.insert(token.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Trim an optional free-text field, treating blank input as absent.
pub(crate) fn optional_field(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
