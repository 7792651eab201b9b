use regex::Regex;
use serde::{Deserialize, Serialize};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::LazyLock;
use tracing::debug;

use crate::catalog::MovieRecord;

/// Grammar for one numbered entry: integer, period, optional quote, title
/// (no quotes, parens, or newlines), optional closing quote, optional
/// parenthesized 4-digit year. Model output that deviates from this shape
/// is skipped, never an error.
static NUMBERED_ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\d+\.\s+["']?([^"'(\n]+)["']?\s*(?:\((\d{4})\))?"#)
        .expect("valid numbered entry regex")
});

/// Fallback poster pool for movies without an IMDb id
const FALLBACK_POSTERS: [&str; 5] = [
    "https://m.media-amazon.com/images/M/MV5BMjAxMzY3NjcxNF5BMl5BanBnXkFtZTcwNTI5OTM0Mw@@._V1_.jpg",
    "https://m.media-amazon.com/images/M/MV5BMjIxNTU4MzY4MF5BMl5BanBnXkFtZTgwMzM4ODI3MjE@._V1_.jpg",
    "https://m.media-amazon.com/images/M/MV5BYWZjMjk3ZTItODQ2ZC00NTY5LWE0ZDYtZTI3MjcwN2Q5NTVkXkEyXkFqcGdeQXVyODk4OTc3MTY@._V1_.jpg",
    "https://m.media-amazon.com/images/M/MV5BMTMxNTMwODM0NF5BMl5BanBnXkFtZTcwODAyMTk2Mw@@._V1_.jpg",
    "https://m.media-amazon.com/images/M/MV5BZjdkOTU3MDktN2IxOS00OGEyLWFmMjktY2FiMmZkNWIyODZiXkEyXkFqcGdeQXVyMTMxODk2OTU@._V1_.jpg",
];

/// A (title, year) pair extracted from model output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    pub title: String,
    pub year: Option<i32>,
}

/// One reconciled recommendation, grounded against the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub title: String,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub description: String,
    pub genres: Vec<String>,
    pub poster: String,
}

/// Extracts numbered entries from free text. Lines that don't fit the
/// grammar are silently skipped.
pub fn parse_numbered_entries(text: &str) -> Vec<ParsedEntry> {
    NUMBERED_ENTRY_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let title = caps.get(1)?.as_str().trim().to_string();
            if title.is_empty() {
                return None;
            }
            let year = caps.get(2).and_then(|y| y.as_str().parse().ok());
            Some(ParsedEntry { title, year })
        })
        .collect()
}

/// Matches extracted entries back onto the candidate set the text was
/// generated from: exact case-insensitive title equality first (with year
/// equality required when both sides carry one), then substring
/// containment either direction, first candidate in set order winning.
/// Unmatched entries are dropped.
pub fn reconcile(text: &str, candidates: &[MovieRecord]) -> Vec<Recommendation> {
    let entries = parse_numbered_entries(text);
    let mut reconciled = Vec::new();

    for entry in &entries {
        let matched = match_candidate(entry, candidates);
        match matched {
            Some(movie) => reconciled.push(to_recommendation(movie)),
            None => debug!(title = %entry.title, year = ?entry.year, "Dropping unmatched entry"),
        }
    }

    debug!(
        extracted = entries.len(),
        reconciled = reconciled.len(),
        "Reconciliation finished"
    );
    reconciled
}

fn match_candidate<'a>(entry: &ParsedEntry, candidates: &'a [MovieRecord]) -> Option<&'a MovieRecord> {
    let wanted = entry.title.to_lowercase();

    let exact = candidates.iter().find(|movie| {
        movie.title.to_lowercase() == wanted
            && match (entry.year, movie.year) {
                (Some(extracted), Some(actual)) => extracted == actual,
                _ => true,
            }
    });
    if exact.is_some() {
        return exact;
    }

    candidates.iter().find(|movie| {
        let title = movie.title.to_lowercase();
        title.contains(&wanted) || wanted.contains(&title)
    })
}

fn to_recommendation(movie: &MovieRecord) -> Recommendation {
    let description = if movie.description.is_empty() {
        "No description available".to_string()
    } else {
        movie.description.clone()
    };

    Recommendation {
        id: movie.id.clone(),
        title: movie.title.clone(),
        year: movie.year,
        rating: movie.rating,
        description,
        genres: movie.genres.clone(),
        poster: resolve_poster(movie.imdb_id.as_deref(), &movie.id),
    }
}

/// Poster reference for a movie: an OMDb image URL when the IMDb id is
/// known, otherwise a pool image chosen by hashing the catalog id so the
/// pick is stable across runs
pub fn resolve_poster(imdb_id: Option<&str>, movie_id: &str) -> String {
    if let Some(imdb_id) = imdb_id.filter(|id| !id.is_empty()) {
        return format!("https://img.omdbapi.com/?i={imdb_id}&apikey=trilogy&h=400");
    }

    let mut hasher = DefaultHasher::new();
    movie_id.hash(&mut hasher);
    let idx = (hasher.finish() % FALLBACK_POSTERS.len() as u64) as usize;
    FALLBACK_POSTERS[idx].to_string()
}
