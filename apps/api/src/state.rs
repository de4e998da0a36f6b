use std::sync::Arc;

use sqlx::PgPool;

use crate::inference::InferenceGateway;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Pluggable AI backend. `HttpInferenceGateway` in production; tests use
    /// `FallbackGateway` to stay offline.
    pub gateway: Arc<dyn InferenceGateway>,
}
