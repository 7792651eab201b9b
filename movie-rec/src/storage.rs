use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::reconcile::Recommendation;

/// The most recent recommendation result for one session: the raw model
/// (or fallback) text, the catalog-grounded records reconciled from it,
/// and which path produced it. Overwritten by each successful request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationOutcome {
    /// Liked titles the recommendation was grounded on
    pub liked: Vec<String>,
    /// Raw recommendation text
    pub text: String,
    /// Catalog-grounded records reconciled from the text
    pub reconciled: Vec<Recommendation>,
    /// True for model-generated output, false for the fallback path
    pub conversational: bool,
    pub created_at: DateTime<Utc>,
}

impl RecommendationOutcome {
    pub fn conversational(
        liked: Vec<String>,
        text: String,
        reconciled: Vec<Recommendation>,
    ) -> Self {
        Self {
            liked,
            text,
            reconciled,
            conversational: true,
            created_at: Utc::now(),
        }
    }
}

/// Conversation context keyed by session id. Follow-up chat turns read the
/// outcome stored for their session; slots are overwritten by newer
/// outcomes and removed only by explicit clearing.
#[async_trait]
pub trait ContextStore: Send + Sync {
    async fn save(&self, session_id: &str, outcome: RecommendationOutcome) -> Result<()>;
    async fn get(&self, session_id: &str) -> Result<Option<RecommendationOutcome>>;
    async fn clear(&self, session_id: &str) -> Result<()>;
    async fn clear_all(&self) -> Result<()>;
}

/// Record store for per-user title lists (favorites, watchlist)
#[async_trait]
pub trait UserRecordStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Vec<String>>;
    async fn add(&self, user_id: &str, title: String) -> Result<()>;
    async fn remove(&self, user_id: &str, title: &str) -> Result<()>;
}

/// In-memory implementation of ContextStore
pub struct InMemoryContextStore {
    slots: Arc<DashMap<String, RecommendationOutcome>>,
}

impl InMemoryContextStore {
    pub fn new() -> Self {
        Self {
            slots: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryContextStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContextStore for InMemoryContextStore {
    async fn save(&self, session_id: &str, outcome: RecommendationOutcome) -> Result<()> {
        self.slots.insert(session_id.to_string(), outcome);
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<RecommendationOutcome>> {
        Ok(self.slots.get(session_id).map(|entry| entry.clone()))
    }

    async fn clear(&self, session_id: &str) -> Result<()> {
        self.slots.remove(session_id);
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        self.slots.clear();
        Ok(())
    }
}

/// In-memory implementation of UserRecordStore
pub struct InMemoryUserRecords {
    records: Arc<DashMap<String, Vec<String>>>,
}

impl InMemoryUserRecords {
    pub fn new() -> Self {
        Self {
            records: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryUserRecords {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRecordStore for InMemoryUserRecords {
    async fn get(&self, user_id: &str) -> Result<Vec<String>> {
        Ok(self
            .records
            .get(user_id)
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }

    async fn add(&self, user_id: &str, title: String) -> Result<()> {
        let mut titles = self.records.entry(user_id.to_string()).or_default();
        if !titles.contains(&title) {
            titles.push(title);
        }
        Ok(())
    }

    async fn remove(&self, user_id: &str, title: &str) -> Result<()> {
        if let Some(mut titles) = self.records.get_mut(user_id) {
            titles.retain(|t| t != title);
        }
        Ok(())
    }
}
