use std::sync::Arc;

use sqlx::PgPool;

use crate::llm_client::GenerateText;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// The generation collaborator. Constructed once at startup and injected
    /// as a trait object so tests can substitute a mock model.
    pub llm: Arc<dyn GenerateText>,
}
