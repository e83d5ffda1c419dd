use std::sync::Arc;

use crate::config::Config;
use crate::ranking::ranker::Ranker;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Ranker holding the read-only language model and skill vocabulary.
    /// Built once at startup; every request borrows it.
    pub ranker: Arc<Ranker>,
}
