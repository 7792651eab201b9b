use std::fmt::Write;

use crate::catalog::{MovieRecord, ReviewStore};
use crate::review::{review_excerpt, top_reviews};

/// Review excerpt budget for fallback rationales
const RATIONALE_EXCERPT_CHARS: usize = 200;
/// Reviews combined into one rationale
const RATIONALE_REVIEW_COUNT: usize = 2;

/// Deterministically renders candidates into recommendation text without
/// invoking generation. The caller always receives usable output even
/// when every completion provider is down; an empty candidate set renders
/// an empty string.
pub fn render_fallback(
    candidates: &[MovieRecord],
    liked: &[String],
    reviews: &dyn ReviewStore,
) -> String {
    let entries: Vec<String> = candidates
        .iter()
        .enumerate()
        .map(|(i, movie)| format_entry(movie, liked, i + 1, reviews))
        .collect();
    entries.join("\n\n")
}

fn format_entry(
    movie: &MovieRecord,
    liked: &[String],
    index: usize,
    reviews: &dyn ReviewStore,
) -> String {
    let excerpts: Vec<String> = top_reviews(reviews, &movie.id, RATIONALE_REVIEW_COUNT)
        .iter()
        .map(|r| review_excerpt(r, RATIONALE_EXCERPT_CHARS))
        .filter(|e| !e.is_empty())
        .collect();

    let mut reason = format!(
        "If you enjoyed {}, you'll appreciate {}'s similar {} elements.",
        liked.join(" and "),
        movie.title,
        movie.genres_display(),
    );
    if !excerpts.is_empty() {
        let _ = write!(reason, " Based on audience reviews, {}", excerpts.join(" "));
    }

    format!(
        "{index}. {} ({})\nRating: {}/10\n\nSynopsis: {}\n\nWhy you might like it: {reason}",
        movie.title,
        movie.year_display(),
        movie.rating_display(),
        movie.description,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{InMemoryReviews, ReviewRecord};

    fn movie(id: &str, title: &str) -> MovieRecord {
        MovieRecord {
            id: id.to_string(),
            title: title.to_string(),
            year: Some(2009),
            rating: Some(8.3),
            genres: vec!["Animation".to_string(), "Adventure".to_string()],
            description: "A house flies on balloons".to_string(),
            imdb_id: None,
        }
    }

    #[test]
    fn empty_candidate_set_renders_empty_string() {
        let reviews = InMemoryReviews::new(vec![]);
        assert_eq!(render_fallback(&[], &["Up".to_string()], &reviews), "");
    }

    #[test]
    fn entries_are_indexed_and_carry_rationale() {
        let reviews = InMemoryReviews::new(vec![]);
        let liked = vec!["Inception".to_string(), "The Matrix".to_string()];
        let text = render_fallback(&[movie("1", "Up"), movie("2", "Coco")], &liked, &reviews);

        assert!(text.starts_with("1. Up (2009)"));
        assert!(text.contains("2. Coco (2009)"));
        assert!(text.contains("Rating: 8.3/10"));
        assert!(text.contains("Synopsis: A house flies on balloons"));
        assert!(text.contains(
            "If you enjoyed Inception and The Matrix, you'll appreciate Up's similar Animation, Adventure elements."
        ));
    }

    #[test]
    fn rationale_embeds_cleaned_review_excerpts() {
        let reviews = InMemoryReviews::new(vec![ReviewRecord {
            movie_id: "1".to_string(),
            text: "Touching<br/>and   beautiful".to_string(),
            helpful: 9,
            total: 10,
        }]);
        let text = render_fallback(&[movie("1", "Up")], &["Coco".to_string()], &reviews);
        assert!(text.contains("Based on audience reviews, Touching and beautiful"));
    }

    #[test]
    fn rendered_output_reconciles_back_onto_the_candidates() {
        // The fallback text follows the same numbered shape the reconciler
        // understands, so downstream consumers can treat both paths alike.
        let reviews = InMemoryReviews::new(vec![]);
        let candidates = vec![movie("1", "Up"), movie("2", "Coco")];
        let text = render_fallback(&candidates, &["Heat".to_string()], &reviews);
        let reconciled = crate::reconcile::reconcile(&text, &candidates);
        assert_eq!(reconciled.len(), 2);
    }
}
