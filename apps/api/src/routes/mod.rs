pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::catalog::handlers as challenges;
use crate::session::handlers as sessions;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Challenge content
        .route("/api/v1/challenges", get(challenges::handle_list_challenges))
        .route("/api/v1/challenges/:id", get(challenges::handle_get_challenge))
        // Sessions
        .route("/api/v1/sessions", post(sessions::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(sessions::handle_get_progress).delete(sessions::handle_end_session),
        )
        .route(
            "/api/v1/sessions/:id/queries",
            post(sessions::handle_submit_query),
        )
        .with_state(state)
}
