use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

use crate::catalog::{ReviewRecord, ReviewStore};

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Returns up to `count` reviews for a movie, most helpful first.
///
/// Ranking key is helpful / max(total, 1); ties keep their original load
/// order. A movie without reviews yields an empty vector.
pub fn top_reviews(store: &dyn ReviewStore, movie_id: &str, count: usize) -> Vec<ReviewRecord> {
    let mut reviews: Vec<ReviewRecord> = store.by_movie(movie_id).to_vec();
    reviews.sort_by(|a, b| {
        b.helpfulness_ratio()
            .partial_cmp(&a.helpfulness_ratio())
            .unwrap_or(Ordering::Equal)
    });
    reviews.truncate(count);
    reviews
}

/// Cleans scraped review text for prompt embedding: HTML line breaks
/// become single spaces, whitespace runs collapse, ends are trimmed
pub fn clean_review_text(text: &str) -> String {
    let text = text.replace("<br/>", " ").replace("<br>", " ");
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Cleaned review text bounded to `max_chars`, cut on a character boundary
pub fn review_excerpt(review: &ReviewRecord, max_chars: usize) -> String {
    let cleaned = clean_review_text(&review.text);
    truncate_chars(&cleaned, max_chars).to_string()
}

/// Prefix of `s` holding at most `max` characters, never splitting a
/// multi-byte character
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
