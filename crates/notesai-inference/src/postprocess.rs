//! Per-operation cleanup of generated text.

use notesai_core::defaults::{CATEGORY_KEEP_TOKENS, CATEGORY_MAX_TOKENS};
use notesai_core::Operation;

/// Apply the post-processing rule for `operation` to trimmed provider text.
pub fn postprocess(operation: Operation, text: &str) -> String {
    match operation {
        Operation::Correction | Operation::Summary => text.to_string(),
        Operation::Categorization => normalize_category(text),
    }
}

/// Reduce a categorization reply to a short label.
///
/// Keeps the first line only. A line with more than three whitespace
/// separated tokens is cut down to its first two, joined by one space.
pub fn normalize_category(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default().trim();
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() > CATEGORY_MAX_TOKENS {
        tokens[..CATEGORY_KEEP_TOKENS].join(" ")
    } else {
        line.to_string()
    }
}
