use std::fmt::Write;

use crate::catalog::{MovieRecord, ReviewStore};
use crate::filter::Filters;
use crate::review::{review_excerpt, top_reviews, truncate_chars};
use crate::storage::RecommendationOutcome;

/// Plot description budget per candidate block
const DESCRIPTION_EXCERPT_CHARS: usize = 200;
/// Budget per embedded review excerpt
const REVIEW_EXCERPT_CHARS: usize = 150;
/// Reviews embedded per candidate
const REVIEWS_PER_CANDIDATE: usize = 2;
/// Conversational turns carried into a chat prompt
const CHAT_HISTORY_WINDOW: usize = 10;

/// Request-local inputs for the recommendation prompt
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub liked: &'a [String],
    pub filters: &'a Filters,
    pub mood: Option<&'a str>,
    pub message: Option<&'a str>,
}

/// One prior exchange in a chat conversation
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    fn label(self) -> &'static str {
        match self {
            TurnRole::User => "User",
            TurnRole::Assistant => "Assistant",
        }
    }
}

/// Preference summary attached to chat turns
#[derive(Debug, Clone, Default)]
pub struct ChatPreferences {
    pub favorites: Vec<String>,
    pub seen: Vec<String>,
    pub mood: Option<String>,
}

impl ChatPreferences {
    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty() && self.seen.is_empty() && self.mood.is_none()
    }
}

/// Renders the natural-language request for a recommendation turn.
///
/// Embeds the liked titles, active filter clauses, mood, the user's
/// message, one evidence block per candidate (in candidate order), and the
/// closing instruction to select exactly 5 entries as a numbered list.
pub fn build_recommendation_prompt(
    ctx: &PromptContext<'_>,
    candidates: &[MovieRecord],
    reviews: &dyn ReviewStore,
) -> String {
    let liked_list = ctx.liked.join(", ");

    let mut prompt = format!(
        "You are a helpful movie recommendation assistant. I'll provide you with movies a user likes and potential recommendations.\n\nUSER LIKES: {liked_list}"
    );

    if !ctx.filters.is_empty() {
        prompt.push_str("\nFILTERS:");
        let mut clauses = Vec::new();
        if let Some(genre) = ctx.filters.genre() {
            clauses.push(format!(" Genre: {genre}"));
        }
        if let Some(year) = ctx.filters.year.as_deref().filter(|y| !y.trim().is_empty()) {
            clauses.push(format!(" Year: {year}"));
        }
        if let Some(rating) = ctx.filters.rating.as_deref().filter(|r| !r.trim().is_empty()) {
            clauses.push(format!(" Minimum Rating: {rating}+/10"));
        }
        prompt.push_str(&clauses.join(","));
    }

    if let Some(mood) = ctx.mood {
        let _ = write!(prompt, "\n\nUSER MOOD: {mood}");
    }

    if let Some(message) = ctx.message {
        let _ = write!(prompt, "\n\nUSER SAYS: \"{message}\"");
    }

    prompt.push_str("\n\nPOTENTIAL RECOMMENDATIONS:\n");
    let blocks: Vec<String> = candidates
        .iter()
        .map(|movie| candidate_block(movie, reviews))
        .collect();
    prompt.push_str(&blocks.join("\n\n"));

    let mut basis = String::from("liked movies");
    if ctx.filters.genre().is_some() {
        basis.push_str(", genre preference");
    }
    if ctx.filters.year.as_deref().is_some_and(|y| !y.trim().is_empty()) {
        basis.push_str(", year preference");
    }
    if ctx.filters.rating.as_deref().is_some_and(|r| !r.trim().is_empty()) {
        basis.push_str(", rating preference");
    }
    if ctx.mood.is_some() {
        basis.push_str(", current mood");
    }

    let mood_clause = ctx
        .mood
        .map(|m| format!(" and is currently feeling {m}"))
        .unwrap_or_default();

    let _ = write!(
        prompt,
        "\n\nBased on the user's {basis}, and the potential recommendations, select the 5 best movies for them.\n\nFor each recommendation, provide:\n1. Title and year\n2. A brief reason why this movie would appeal to someone who enjoyed {liked_list}{mood_clause}\n3. Mention specific elements like themes, style, emotional impact, or storytelling that connect it to the user's preferences\n4. Keep explanations concise but insightful\n5. Format your response as numbered recommendations (1-5)\n\nStart with a brief personalized message and end with a follow-up question."
    );

    prompt
}

fn candidate_block(movie: &MovieRecord, reviews: &dyn ReviewStore) -> String {
    let excerpts: Vec<String> = top_reviews(reviews, &movie.id, REVIEWS_PER_CANDIDATE)
        .iter()
        .map(|r| review_excerpt(r, REVIEW_EXCERPT_CHARS))
        .filter(|e| !e.is_empty())
        .collect();
    let review_line = if excerpts.is_empty() {
        "No reviews available".to_string()
    } else {
        excerpts.join(" ")
    };

    format!(
        "- \"{}\" ({}) - Rating: {}/10\n   Genres: {}\n   Plot: {}\n   Reviews: {}",
        movie.title,
        movie.year_display(),
        movie.rating_display(),
        movie.genres_display(),
        truncate_chars(&movie.description, DESCRIPTION_EXCERPT_CHARS),
        review_line,
    )
}

/// Renders a conversational follow-up prompt: recent turns, a preference
/// summary, the last stored recommendation outcome, then the new message.
/// No candidate-selection instruction is attached.
pub fn build_chat_prompt(
    turns: &[ChatTurn],
    prefs: &ChatPreferences,
    last_outcome: Option<&RecommendationOutcome>,
    message: &str,
) -> String {
    let mut prompt = String::from("You are a helpful movie recommendation assistant. ");

    let recent = &turns[turns.len().saturating_sub(CHAT_HISTORY_WINDOW)..];
    if !recent.is_empty() {
        prompt.push_str("Here's our recent conversation:\n\n");
        for turn in recent {
            let _ = writeln!(prompt, "{}: {}", turn.role.label(), turn.text);
        }
        prompt.push('\n');
    }

    if !prefs.is_empty() {
        prompt.push_str("User preferences:\n");
        if !prefs.favorites.is_empty() {
            let _ = writeln!(prompt, "- Favorite movies: {}", prefs.favorites.join(", "));
        }
        if !prefs.seen.is_empty() {
            let _ = writeln!(prompt, "- Recently seen movies: {}", prefs.seen.join(", "));
        }
        if let Some(mood) = &prefs.mood {
            let _ = writeln!(prompt, "- Current mood: {mood}");
        }
        prompt.push('\n');
    }

    if let Some(outcome) = last_outcome {
        let _ = write!(
            prompt,
            "I previously recommended these movies based on your interest in {}:\n\n{}\n\n",
            outcome.liked.join(", "),
            outcome.text,
        );
    }

    let _ = write!(prompt, "User: {message}\n\nAssistant:");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryReviews;
    use crate::catalog::ReviewRecord;

    fn movie(id: &str, title: &str, description: &str) -> MovieRecord {
        MovieRecord {
            id: id.to_string(),
            title: title.to_string(),
            year: Some(2009),
            rating: Some(8.3),
            genres: vec!["Animation".to_string(), "Adventure".to_string()],
            description: description.to_string(),
            imdb_id: None,
        }
    }

    fn no_reviews() -> InMemoryReviews {
        InMemoryReviews::new(vec![])
    }

    #[test]
    fn recommendation_prompt_embeds_liked_and_candidates() {
        let liked = vec!["Inception (2010)".to_string()];
        let filters = Filters::default();
        let ctx = PromptContext {
            liked: &liked,
            filters: &filters,
            mood: None,
            message: None,
        };
        let candidates = vec![movie("2", "Up", "A retired balloon salesman flies away")];
        let prompt = build_recommendation_prompt(&ctx, &candidates, &no_reviews());

        assert!(prompt.contains("USER LIKES: Inception (2010)"));
        assert!(prompt.contains("- \"Up\" (2009) - Rating: 8.3/10"));
        assert!(prompt.contains("Genres: Animation, Adventure"));
        assert!(prompt.contains("Reviews: No reviews available"));
        assert!(prompt.contains("select the 5 best movies"));
        assert!(prompt.contains("numbered recommendations (1-5)"));
        assert!(!prompt.contains("FILTERS:"));
        assert!(!prompt.contains("USER MOOD"));
    }

    #[test]
    fn filters_mood_and_message_render_as_clauses() {
        let liked = vec!["Up".to_string()];
        let filters = Filters {
            genre: Some("Sci-Fi".to_string()),
            year: Some("1990-2010".to_string()),
            rating: Some("8.0".to_string()),
        };
        let ctx = PromptContext {
            liked: &liked,
            filters: &filters,
            mood: Some("nostalgic"),
            message: Some("something epic please"),
        };
        let prompt = build_recommendation_prompt(&ctx, &[], &no_reviews());

        assert!(prompt.contains("FILTERS: Genre: Sci-Fi, Year: 1990-2010, Minimum Rating: 8.0+/10"));
        assert!(prompt.contains("USER MOOD: nostalgic"));
        assert!(prompt.contains("USER SAYS: \"something epic please\""));
        assert!(prompt.contains("genre preference, year preference, rating preference, current mood"));
        assert!(prompt.contains("currently feeling nostalgic"));
    }

    #[test]
    fn description_and_reviews_are_truncated() {
        let long_description = "x".repeat(500);
        let candidates = vec![movie("1", "Long", &long_description)];
        let reviews = InMemoryReviews::new(vec![ReviewRecord {
            movie_id: "1".to_string(),
            text: "y".repeat(400),
            helpful: 1,
            total: 1,
        }]);
        let liked = vec!["Up".to_string()];
        let filters = Filters::default();
        let ctx = PromptContext {
            liked: &liked,
            filters: &filters,
            mood: None,
            message: None,
        };
        let prompt = build_recommendation_prompt(&ctx, &candidates, &reviews);

        assert!(prompt.contains(&"x".repeat(200)));
        assert!(!prompt.contains(&"x".repeat(201)));
        assert!(prompt.contains(&"y".repeat(150)));
        assert!(!prompt.contains(&"y".repeat(151)));
    }

    #[test]
    fn chat_prompt_windows_history_and_labels_roles() {
        let turns: Vec<ChatTurn> = (0..14)
            .map(|i| ChatTurn {
                role: if i % 2 == 0 { TurnRole::User } else { TurnRole::Assistant },
                text: format!("turn {i}"),
            })
            .collect();
        let prompt = build_chat_prompt(&turns, &ChatPreferences::default(), None, "what else?");

        assert!(!prompt.contains("turn 3"));
        assert!(prompt.contains("User: turn 4"));
        assert!(prompt.contains("Assistant: turn 13"));
        assert!(prompt.ends_with("User: what else?\n\nAssistant:"));
        assert!(!prompt.contains("select the 5 best"));
    }

    #[test]
    fn chat_prompt_includes_preferences_and_last_outcome() {
        let prefs = ChatPreferences {
            favorites: vec!["Up".to_string()],
            seen: vec!["The Matrix".to_string()],
            mood: Some("cheerful".to_string()),
        };
        let outcome = RecommendationOutcome::conversational(
            vec!["Inception".to_string()],
            "1. \"Up\" (2009) - a joyful ride".to_string(),
            vec![],
        );
        let prompt = build_chat_prompt(&[], &prefs, Some(&outcome), "more like these");

        assert!(prompt.contains("- Favorite movies: Up"));
        assert!(prompt.contains("- Recently seen movies: The Matrix"));
        assert!(prompt.contains("- Current mood: cheerful"));
        assert!(prompt.contains("I previously recommended these movies based on your interest in Inception:"));
        assert!(prompt.contains("a joyful ride"));
    }

    #[test]
    fn chat_prompt_without_context_is_minimal() {
        let prompt = build_chat_prompt(&[], &ChatPreferences::default(), None, "hi");
        assert_eq!(
            prompt,
            "You are a helpful movie recommendation assistant. User: hi\n\nAssistant:"
        );
    }
}
