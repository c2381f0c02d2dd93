//! Fuzzy comparison of skill and capability names
//!
//! Scores are Sørensen–Dice coefficients over character bigrams of the
//! normalized terms, with whitespace removed. Identical terms score 1.0.

use std::collections::BTreeSet;

use crate::domain::normalize_term;

fn bigrams(term: &str) -> Vec<(char, char)> {
    let chars: Vec<char> = term.chars().filter(|c| !c.is_whitespace()).collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}

/// Similarity of two terms in `[0, 1]`
pub fn term_similarity(a: &str, b: &str) -> f64 {
    let a = normalize_term(a);
    let b = normalize_term(b);
    if a == b {
        return 1.0;
    }

    let left = bigrams(&a);
    let mut right = bigrams(&b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let total = left.len() + right.len();
    let mut shared = 0usize;
    for pair in &left {
        if let Some(pos) = right.iter().position(|p| p == pair) {
            right.swap_remove(pos);
            shared += 1;
        }
    }

    (2 * shared) as f64 / total as f64
}

/// Confidence that `offered` covers every term in `required`
///
/// Each required term is scored against its best offered term; the set
/// scores as its weakest requirement. An empty requirement set is 1.0.
pub fn requirement_confidence(required: &BTreeSet<String>, offered: &BTreeSet<String>) -> f64 {
    required
        .iter()
        .map(|r| {
            offered
                .iter()
                .map(|o| term_similarity(r, o))
                .fold(0.0, f64::max)
        })
        .fold(1.0, f64::min)
}
