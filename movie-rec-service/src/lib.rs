//! HTTP service wrapping the recommendation pipeline: catalog loading,
//! completion provider adapters, and the axum routes.

pub mod config;
pub mod data;
pub mod handlers;
pub mod models;
pub mod providers;
