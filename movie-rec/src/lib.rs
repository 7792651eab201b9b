//! Catalog-grounded movie recommendation pipeline.
//!
//! The flow per request: [`filter::select_candidates`] narrows the catalog
//! to a ranked candidate set, [`prompt::build_recommendation_prompt`]
//! renders a bounded natural-language request embedding candidate
//! evidence, [`gateway::GenerationGateway`] invokes the configured
//! completion providers, and [`reconcile::reconcile`] grounds the model's
//! free-text answer back onto catalog records. When every provider fails,
//! [`fallback::render_fallback`] produces the same output shape
//! deterministically. Follow-up chat turns read the outcome stored in a
//! session-keyed [`storage::ContextStore`].

pub mod catalog;
pub mod error;
pub mod fallback;
pub mod filter;
pub mod gateway;
pub mod prompt;
pub mod reconcile;
pub mod review;
pub mod storage;

pub use catalog::{
    CatalogStore, InMemoryCatalog, InMemoryReviews, MovieRecord, ReviewRecord, ReviewStore,
};
pub use error::{RecError, Result};
pub use fallback::render_fallback;
pub use filter::{select_candidates, Filters, YearFilter, DEFAULT_CANDIDATE_LIMIT};
pub use gateway::{CompletionProvider, GenerationGateway};
pub use prompt::{
    build_chat_prompt, build_recommendation_prompt, ChatPreferences, ChatTurn, PromptContext,
    TurnRole,
};
pub use reconcile::{parse_numbered_entries, reconcile, resolve_poster, Recommendation};
pub use storage::{
    ContextStore, InMemoryContextStore, InMemoryUserRecords, RecommendationOutcome,
    UserRecordStore,
};
