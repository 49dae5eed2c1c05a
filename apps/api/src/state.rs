use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::grading::PredicateRegistry;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Read-only challenge content.
    pub catalog: Arc<Catalog>,
    /// Semantic predicates keyed by challenge id, built from the catalog.
    pub predicates: Arc<PredicateRegistry>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: Config, catalog: Catalog) -> Self {
        let predicates = catalog.predicate_registry();
        let sessions = SessionStore::new(config.max_sessions, config.session_idle_ttl());
        Self {
            config,
            catalog: Arc::new(catalog),
            predicates: Arc::new(predicates),
            sessions: Arc::new(sessions),
        }
    }
}
