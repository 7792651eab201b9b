use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single movie in the catalog. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: String,
    pub title: String,
    /// Release year; absent when the source data carried a non-numeric value
    pub year: Option<i32>,
    /// Aggregate rating on a 0-10 scale; absent when non-numeric in the source
    pub rating: Option<f64>,
    pub genres: Vec<String>,
    pub description: String,
    /// IMDb identifier used for poster resolution
    pub imdb_id: Option<String>,
}

impl MovieRecord {
    /// Genre list rendered for prompts and rationales
    pub fn genres_display(&self) -> String {
        self.genres.join(", ")
    }

    pub fn year_display(&self) -> String {
        self.year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub fn rating_display(&self) -> String {
        self.rating
            .map(|r| format!("{r}"))
            .unwrap_or_else(|| "N/A".to_string())
    }
}

/// A user review attached to a catalog movie. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub movie_id: String,
    pub text: String,
    /// Helpfulness votes in favor
    pub helpful: u32,
    /// Total helpfulness votes cast
    pub total: u32,
}

impl ReviewRecord {
    /// Helpfulness ratio; a zero denominator counts as one so unvoted
    /// reviews rank by their raw helpful count
    pub fn helpfulness_ratio(&self) -> f64 {
        f64::from(self.helpful) / f64::from(self.total.max(1))
    }
}

/// Splits the source data's delimited genre field into a clean list.
/// The upstream dataset separates genres with runs of two or more spaces.
pub fn parse_genre_list(raw: &str) -> Vec<String> {
    raw.split("  ")
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read-only catalog access, loaded once at startup
pub trait CatalogStore: Send + Sync {
    fn lookup(&self, id: &str) -> Option<&MovieRecord>;
    fn all(&self) -> &[MovieRecord];
}

/// Read-only review access keyed by movie id
pub trait ReviewStore: Send + Sync {
    /// Reviews for a movie in original load order; empty when none exist
    fn by_movie(&self, movie_id: &str) -> &[ReviewRecord];
}

/// In-memory catalog backed by a vector plus an id index
pub struct InMemoryCatalog {
    movies: Vec<MovieRecord>,
    index: HashMap<String, usize>,
}

impl InMemoryCatalog {
    pub fn new(movies: Vec<MovieRecord>) -> Self {
        let index = movies
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id.clone(), i))
            .collect();
        Self { movies, index }
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

impl CatalogStore for InMemoryCatalog {
    fn lookup(&self, id: &str) -> Option<&MovieRecord> {
        self.index.get(id).map(|&i| &self.movies[i])
    }

    fn all(&self) -> &[MovieRecord] {
        &self.movies
    }
}

/// In-memory review collection grouped by movie id
pub struct InMemoryReviews {
    by_movie: HashMap<String, Vec<ReviewRecord>>,
    count: usize,
}

impl InMemoryReviews {
    pub fn new(reviews: Vec<ReviewRecord>) -> Self {
        let count = reviews.len();
        let mut by_movie: HashMap<String, Vec<ReviewRecord>> = HashMap::new();
        for review in reviews {
            by_movie.entry(review.movie_id.clone()).or_default().push(review);
        }
        Self { by_movie, count }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl ReviewStore for InMemoryReviews {
    fn by_movie(&self, movie_id: &str) -> &[ReviewRecord] {
        self.by_movie
            .get(movie_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
