//! Loads the pre-processed catalog and review files into the in-memory
//! stores at startup. The files are JSON exports of the upstream dataset,
//! which kept every column as text; numeric fields are parsed leniently
//! and left absent when they don't parse.

use anyhow::Context;
use movie_rec::catalog::parse_genre_list;
use movie_rec::{InMemoryCatalog, InMemoryReviews, MovieRecord, ReviewRecord};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// A value that may arrive as a JSON number or as the source data's
/// string-typed column
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LenientField {
    Number(f64),
    Text(String),
}

impl LenientField {
    fn as_f64(&self) -> Option<f64> {
        match self {
            LenientField::Number(n) => Some(*n),
            LenientField::Text(s) => s.trim().parse().ok(),
        }
    }

    fn as_i32(&self) -> Option<i32> {
        self.as_f64().map(|n| n as i32)
    }

    fn as_u32(&self) -> u32 {
        self.as_f64().map(|n| n.max(0.0) as u32).unwrap_or(0)
    }
}

#[derive(Debug, Deserialize)]
struct RawMovie {
    movie_id: String,
    name: String,
    year: Option<LenientField>,
    rating: Option<LenientField>,
    #[serde(default)]
    genres: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    imdb_id: String,
}

impl From<RawMovie> for MovieRecord {
    fn from(raw: RawMovie) -> Self {
        let description = if raw.description.trim().is_empty() {
            "No description available".to_string()
        } else {
            raw.description.trim().to_string()
        };

        MovieRecord {
            id: raw.movie_id,
            title: raw.name,
            year: raw.year.as_ref().and_then(LenientField::as_i32),
            rating: raw.rating.as_ref().and_then(LenientField::as_f64),
            genres: parse_genre_list(&raw.genres),
            description,
            imdb_id: Some(raw.imdb_id).filter(|id| !id.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawReview {
    movie_id: String,
    #[serde(default)]
    review: String,
    helpful: Option<LenientField>,
    total: Option<LenientField>,
}

impl From<RawReview> for ReviewRecord {
    fn from(raw: RawReview) -> Self {
        ReviewRecord {
            movie_id: raw.movie_id,
            text: raw.review,
            helpful: raw.helpful.as_ref().map(LenientField::as_u32).unwrap_or(0),
            total: raw.total.as_ref().map(LenientField::as_u32).unwrap_or(0),
        }
    }
}

pub fn load_catalog(path: impl AsRef<Path>) -> anyhow::Result<InMemoryCatalog> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open catalog file {}", path.display()))?;
    let raw: Vec<RawMovie> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse catalog file {}", path.display()))?;

    let catalog = InMemoryCatalog::new(raw.into_iter().map(MovieRecord::from).collect());
    info!(movies = catalog.len(), path = %path.display(), "Loaded movie catalog");
    Ok(catalog)
}

pub fn load_reviews(path: impl AsRef<Path>) -> anyhow::Result<InMemoryReviews> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("failed to open reviews file {}", path.display()))?;
    let raw: Vec<RawReview> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse reviews file {}", path.display()))?;

    let reviews = InMemoryReviews::new(raw.into_iter().map(ReviewRecord::from).collect());
    info!(reviews = reviews.len(), path = %path.display(), "Loaded reviews");
    Ok(reviews)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_movie_converts_string_columns() {
        let json = r#"{
            "movie_id": "tt0435761",
            "name": "Toy Story 3",
            "year": "2010",
            "rating": "8.2",
            "genres": "Animation  Adventure  Comedy",
            "description": "The toys face an uncertain future",
            "imdb_id": "tt0435761"
        }"#;
        let raw: RawMovie = serde_json::from_str(json).unwrap();
        let movie = MovieRecord::from(raw);

        assert_eq!(movie.year, Some(2010));
        assert_eq!(movie.rating, Some(8.2));
        assert_eq!(movie.genres, vec!["Animation", "Adventure", "Comedy"]);
        assert_eq!(movie.imdb_id.as_deref(), Some("tt0435761"));
    }

    #[test]
    fn non_numeric_year_and_rating_become_absent() {
        let json = r#"{
            "movie_id": "m1",
            "name": "Obscure Short",
            "year": "unknown",
            "rating": "not rated",
            "genres": "Drama"
        }"#;
        let raw: RawMovie = serde_json::from_str(json).unwrap();
        let movie = MovieRecord::from(raw);

        assert_eq!(movie.year, None);
        assert_eq!(movie.rating, None);
        assert_eq!(movie.description, "No description available");
        assert_eq!(movie.imdb_id, None);
    }

    #[test]
    fn numeric_json_fields_are_accepted_too() {
        let json = r#"{"movie_id": "m1", "name": "X", "year": 1999, "rating": 7.5, "genres": ""}"#;
        let raw: RawMovie = serde_json::from_str(json).unwrap();
        let movie = MovieRecord::from(raw);
        assert_eq!(movie.year, Some(1999));
        assert_eq!(movie.rating, Some(7.5));
        assert!(movie.genres.is_empty());
    }

    #[test]
    fn raw_review_defaults_missing_counts_to_zero() {
        let json = r#"{"movie_id": "m1", "review": "solid", "helpful": "12", "total": "15"}"#;
        let review = ReviewRecord::from(serde_json::from_str::<RawReview>(json).unwrap());
        assert_eq!(review.helpful, 12);
        assert_eq!(review.total, 15);

        let json = r#"{"movie_id": "m1", "review": "bare"}"#;
        let review = ReviewRecord::from(serde_json::from_str::<RawReview>(json).unwrap());
        assert_eq!(review.helpful, 0);
        assert_eq!(review.total, 0);
    }
}
