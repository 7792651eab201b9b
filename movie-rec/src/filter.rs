use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::LazyLock;
use tracing::debug;

use crate::catalog::{CatalogStore, MovieRecord};

/// Default candidate set size for the generation path
pub const DEFAULT_CANDIDATE_LIMIT: usize = 15;

static YEAR_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(\d{4}\)\s*$").expect("valid year suffix regex"));

/// Per-request filter constraints, kept as the raw strings the caller sent.
/// Malformed values degrade to absent constraints rather than errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Filters {
    pub genre: Option<String>,
    pub year: Option<String>,
    pub rating: Option<String>,
}

/// Parsed form of the year expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearFilter {
    /// `pre-1970`: keep movies released before 1970
    Pre1970,
    /// `A-B`: keep movies with A <= year <= B
    Range(i32, i32),
    /// Anything else, including unparsable ranges. The original filtering
    /// logic silently ignores such values; preserved pending product
    /// clarification.
    Unconstrained,
}

impl YearFilter {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw == "pre-1970" {
            return YearFilter::Pre1970;
        }
        if let Some((start, end)) = raw.split_once('-') {
            if let (Ok(start), Ok(end)) = (start.trim().parse(), end.trim().parse()) {
                return YearFilter::Range(start, end);
            }
        }
        YearFilter::Unconstrained
    }

    /// Movies without a known year fail any active year constraint
    pub fn matches(&self, year: Option<i32>) -> bool {
        match (self, year) {
            (YearFilter::Unconstrained, _) => true,
            (YearFilter::Pre1970, Some(y)) => y < 1970,
            (YearFilter::Range(start, end), Some(y)) => *start <= y && y <= *end,
            (_, None) => false,
        }
    }
}

impl Filters {
    fn non_empty(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn genre(&self) -> Option<&str> {
        Self::non_empty(&self.genre)
    }

    pub fn year_filter(&self) -> YearFilter {
        Self::non_empty(&self.year)
            .map(YearFilter::parse)
            .unwrap_or(YearFilter::Unconstrained)
    }

    /// Minimum rating threshold; None when absent or not a decimal
    pub fn min_rating(&self) -> Option<f64> {
        Self::non_empty(&self.rating).and_then(|r| r.parse().ok())
    }

    pub fn is_empty(&self) -> bool {
        self.genre().is_none() && Self::non_empty(&self.year).is_none()
            && Self::non_empty(&self.rating).is_none()
    }
}

/// Strips a trailing parenthesized 4-digit year and case-folds, so
/// "Inception (2010)" and "inception" compare equal
pub fn normalize_title(title: &str) -> String {
    YEAR_SUFFIX_RE.replace(title, "").trim().to_lowercase()
}

/// Narrows the catalog to a ranked candidate set.
///
/// Applies genre/year/rating constraints, drops anything whose normalized
/// title overlaps a liked title (either containment direction), sorts by
/// rating descending with catalog order preserved on ties, and truncates
/// to `limit`. An empty catalog yields an empty set; absent filters are
/// no-ops.
pub fn select_candidates(
    catalog: &dyn CatalogStore,
    liked: &[String],
    filters: &Filters,
    limit: usize,
) -> Vec<MovieRecord> {
    let genre = filters.genre().map(str::to_lowercase);
    let year_filter = filters.year_filter();
    let min_rating = filters.min_rating();
    let liked_normalized: Vec<String> = liked.iter().map(|t| normalize_title(t)).collect();

    let mut candidates: Vec<MovieRecord> = catalog
        .all()
        .iter()
        .filter(|movie| match &genre {
            Some(genre) => movie
                .genres
                .iter()
                .any(|g| g.to_lowercase().contains(genre)),
            None => true,
        })
        .filter(|movie| year_filter.matches(movie.year))
        .filter(|movie| match min_rating {
            Some(min) => movie.rating.is_some_and(|r| r >= min),
            None => true,
        })
        .filter(|movie| {
            let title = normalize_title(&movie.title);
            !liked_normalized
                .iter()
                .any(|l| !l.is_empty() && (title.contains(l.as_str()) || l.contains(&title)))
        })
        .cloned()
        .collect();

    // Stable sort keeps catalog order for equal ratings; unrated movies sink
    candidates.sort_by(|a, b| {
        let a = a.rating.unwrap_or(f64::NEG_INFINITY);
        let b = b.rating.unwrap_or(f64::NEG_INFINITY);
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    });
    candidates.truncate(limit);

    debug!(
        candidates = candidates.len(),
        limit,
        genre = ?genre,
        year = ?year_filter,
        min_rating = ?min_rating,
        "Candidate set selected"
    );

    candidates
}
