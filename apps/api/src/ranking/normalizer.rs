//! Text normalization ahead of vectorization.

use crate::nlp::{tokenize, Stopwords};

/// Lowercases, tokenizes, keeps purely alphanumeric tokens and drops stopwords.
/// Surviving tokens are joined with single spaces, order preserved.
///
/// Empty output is valid (blank or all-stopword input).
pub fn normalize(text: &str, stopwords: &Stopwords) -> String {
    let text = text.replace(['\n', '\r'], " ");
    let text = text.trim().to_lowercase();

    tokenize(&text)
        .into_iter()
        .map(|t| t.text)
        .filter(|t| t.chars().all(char::is_alphanumeric))
        .filter(|t| !stopwords.contains(t))
        .collect::<Vec<_>>()
        .join(" ")
}
