use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;
use movie_rec::prompt::{ChatPreferences, ChatTurn, PromptContext, TurnRole};
use movie_rec::review::top_reviews;
use movie_rec::storage::{ContextStore, RecommendationOutcome, UserRecordStore};
use movie_rec::{
    build_chat_prompt, build_recommendation_prompt, reconcile, render_fallback, select_candidates,
    CatalogStore, Filters, GenerationGateway, ReviewStore, DEFAULT_CANDIDATE_LIMIT,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{
    ChatRequest, ChatResponse, ClearContextRequest, ClearContextResponse, ErrorResponse,
    FavoriteRequest, FavoritesResponse, MovieDetail, MovieSummary, RecommendRequest,
    RecommendResponse,
};

/// Candidates surfaced by the fallback formatter when generation is down
const FALLBACK_SHORTLIST: usize = 5;

/// Reviews included in a movie detail response
const DETAIL_REVIEW_COUNT: usize = 5;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub reviews: Arc<dyn ReviewStore>,
    pub gateway: Arc<GenerationGateway>,
    pub contexts: Arc<dyn ContextStore>,
    pub user_records: Arc<dyn UserRecordStore>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/movies", get(list_movies))
        .route("/api/movies/{id}", get(get_movie))
        .route("/api/recommend", post(recommend))
        .route("/api/chat", post(chat))
        .route("/api/clear-context", post(clear_context))
        .route(
            "/api/user/{user_id}/favorites",
            get(get_favorites).post(add_favorite),
        )
        .route(
            "/api/user/{user_id}/favorites/{title}",
            delete(remove_favorite),
        )
        .with_state(state)
}

fn internal_error(err: impl std::fmt::Display) -> (StatusCode, Json<ErrorResponse>) {
    warn!(error = %err, "Request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_movies(State(state): State<AppState>) -> Json<Vec<MovieSummary>> {
    let movies = state
        .catalog
        .all()
        .iter()
        .map(|m| MovieSummary {
            id: m.id.clone(),
            title: m.title.clone(),
            year: m.year,
        })
        .collect();
    Json(movies)
}

async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MovieDetail>, (StatusCode, Json<ErrorResponse>)> {
    let movie = state.catalog.lookup(&id).ok_or((
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Movie not found".to_string(),
        }),
    ))?;

    Ok(Json(MovieDetail {
        id: movie.id.clone(),
        title: movie.title.clone(),
        year: movie.year,
        rating: movie.rating,
        genres: movie.genres.clone(),
        description: movie.description.clone(),
        reviews: top_reviews(state.reviews.as_ref(), &id, DETAIL_REVIEW_COUNT),
    }))
}

/// One recommendation turn: narrow the catalog, ask the gateway, reconcile
/// the answer, and remember the outcome for follow-up chat. Generation
/// failure degrades to the deterministic fallback text instead of a 5xx.
async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, (StatusCode, Json<ErrorResponse>)> {
    let session_id = request
        .session_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let filters = Filters {
        genre: request.genre,
        year: request.year,
        rating: request.rating,
    };
    let candidates = select_candidates(
        state.catalog.as_ref(),
        &request.movies,
        &filters,
        DEFAULT_CANDIDATE_LIMIT,
    );
    info!(
        session_id,
        liked = request.movies.len(),
        candidates = candidates.len(),
        "Processing recommendation request"
    );

    let ctx = PromptContext {
        liked: &request.movies,
        filters: &filters,
        mood: request.mood.as_deref(),
        message: request.message.as_deref(),
    };
    let prompt = build_recommendation_prompt(&ctx, &candidates, state.reviews.as_ref());

    match state.gateway.generate(&prompt).await {
        Ok(text) => {
            let enhanced = reconcile(&text, &candidates);
            let outcome = RecommendationOutcome::conversational(
                request.movies.clone(),
                text.clone(),
                enhanced.clone(),
            );
            state
                .contexts
                .save(&session_id, outcome)
                .await
                .map_err(internal_error)?;

            Ok(Json(RecommendResponse {
                session_id,
                recommendations: text,
                enhanced,
                conversational: true,
                error: None,
            }))
        }
        Err(err) => {
            warn!(session_id, error = %err, "Generation unavailable, using fallback formatter");
            let mut shortlist = candidates;
            shortlist.truncate(FALLBACK_SHORTLIST);
            let text = render_fallback(&shortlist, &request.movies, state.reviews.as_ref());

            let outcome = RecommendationOutcome {
                liked: request.movies.clone(),
                text: text.clone(),
                reconciled: vec![],
                conversational: false,
                created_at: Utc::now(),
            };
            state
                .contexts
                .save(&session_id, outcome)
                .await
                .map_err(internal_error)?;

            Ok(Json(RecommendResponse {
                session_id,
                recommendations: text,
                enhanced: vec![],
                conversational: false,
                error: Some(err.to_string()),
            }))
        }
    }
}

/// Follow-up chat turn grounded in the session's stored outcome. Unlike
/// the recommendation endpoint there is no fallback text to degrade to, so
/// gateway failure surfaces as an error response.
async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    let turns: Vec<ChatTurn> = request
        .history
        .iter()
        .filter_map(|entry| {
            let role = match entry.kind.as_str() {
                "user" => TurnRole::User,
                "bot" => TurnRole::Assistant,
                _ => return None,
            };
            entry.message.as_ref().map(|message| ChatTurn {
                role,
                text: message.clone(),
            })
        })
        .collect();

    let context = request.context.as_ref();
    let mood = context.and_then(|c| c.mood.clone()).or_else(|| {
        request
            .history
            .iter()
            .rev()
            .find_map(|e| e.filters.as_ref().and_then(|f| f.mood.clone()))
    });
    let mut favorites = context
        .and_then(|c| c.favorites.clone())
        .unwrap_or_default();
    if favorites.is_empty() {
        if let Some(user_id) = request.user_id.as_deref() {
            favorites = state
                .user_records
                .get(user_id)
                .await
                .map_err(internal_error)?;
        }
    }
    let prefs = ChatPreferences {
        favorites,
        seen: context.and_then(|c| c.seen_movies.clone()).unwrap_or_default(),
        mood,
    };

    let outcome = match request.session_id.as_deref() {
        Some(session_id) => state
            .contexts
            .get(session_id)
            .await
            .map_err(internal_error)?,
        None => None,
    };

    let prompt = build_chat_prompt(&turns, &prefs, outcome.as_ref(), &request.message);
    let response = state
        .gateway
        .generate(&prompt)
        .await
        .map_err(internal_error)?;

    Ok(Json(ChatResponse {
        response: response.trim().to_string(),
    }))
}

/// Clears one conversation slot when a session id is supplied, every slot
/// otherwise. Missing sessions are not an error.
async fn clear_context(
    State(state): State<AppState>,
    body: Option<Json<ClearContextRequest>>,
) -> Result<Json<ClearContextResponse>, (StatusCode, Json<ErrorResponse>)> {
    let request = body.map(|Json(b)| b).unwrap_or_default();

    let message = match request.session_id {
        Some(session_id) => {
            state
                .contexts
                .clear(&session_id)
                .await
                .map_err(internal_error)?;
            "Conversation context cleared"
        }
        None => {
            state.contexts.clear_all().await.map_err(internal_error)?;
            "All conversation contexts cleared"
        }
    };

    Ok(Json(ClearContextResponse {
        success: true,
        message: message.to_string(),
    }))
}

async fn get_favorites(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<FavoritesResponse>, (StatusCode, Json<ErrorResponse>)> {
    let favorites = state
        .user_records
        .get(&user_id)
        .await
        .map_err(internal_error)?;
    Ok(Json(FavoritesResponse { favorites }))
}

async fn add_favorite(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<FavoriteRequest>,
) -> Result<Json<FavoritesResponse>, (StatusCode, Json<ErrorResponse>)> {
    state
        .user_records
        .add(&user_id, request.title)
        .await
        .map_err(internal_error)?;
    let favorites = state
        .user_records
        .get(&user_id)
        .await
        .map_err(internal_error)?;
    Ok(Json(FavoritesResponse { favorites }))
}

async fn remove_favorite(
    State(state): State<AppState>,
    Path((user_id, title)): Path<(String, String)>,
) -> Result<Json<FavoritesResponse>, (StatusCode, Json<ErrorResponse>)> {
    state
        .user_records
        .remove(&user_id, &title)
        .await
        .map_err(internal_error)?;
    let favorites = state
        .user_records
        .get(&user_id)
        .await
        .map_err(internal_error)?;
    Ok(Json(FavoritesResponse { favorites }))
}
