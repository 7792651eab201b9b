use movie_rec::{Recommendation, ReviewRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    /// Titles the user likes, optionally suffixed with "(year)"
    pub movies: Vec<String>,
    pub genre: Option<String>,
    pub year: Option<String>,
    pub rating: Option<String>,
    pub message: Option<String>,
    pub mood: Option<String>,
    /// Conversation slot to store the outcome under; a fresh id is
    /// generated when absent
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub session_id: String,
    /// Generated or fallback recommendation text
    pub recommendations: String,
    /// Catalog-grounded records reconciled from the text
    pub enhanced: Vec<Recommendation>,
    /// True when the text came from the model, false for the fallback path
    pub conversational: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    pub context: Option<ChatContext>,
    pub session_id: Option<String>,
    pub user_id: Option<String>,
}

/// One entry of the client-side conversation log. `user`/`bot` entries
/// carry a message; `recommendation` entries carry the titles a past
/// recommendation was based on and the filters that were active.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: Option<String>,
    pub movies: Option<Vec<String>>,
    pub filters: Option<HistoryFilters>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryFilters {
    pub genre: Option<String>,
    pub year: Option<String>,
    pub rating: Option<String>,
    pub mood: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatContext {
    #[serde(rename = "seenMovies")]
    pub seen_movies: Option<Vec<String>>,
    pub favorites: Option<Vec<String>>,
    pub mood: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClearContextRequest {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClearContextResponse {
    pub success: bool,
    pub message: String,
}

/// Autocomplete projection of a catalog movie
#[derive(Debug, Serialize)]
pub struct MovieSummary {
    pub id: String,
    pub title: String,
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct MovieDetail {
    pub id: String,
    pub title: String,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub genres: Vec<String>,
    pub description: String,
    pub reviews: Vec<ReviewRecord>,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
