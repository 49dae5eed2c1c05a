//! Axum route handlers for the Session API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::catalog::SqlChallenge;
use crate::errors::AppError;
use crate::session::{ChallengeProgress, ChallengeSession, Submission};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub challenge_id: String,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub challenge: SqlChallenge,
}

#[derive(Debug, Deserialize)]
pub struct SubmitQueryRequest {
    pub query: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), AppError> {
    let challenge = state
        .catalog
        .get(&req.challenge_id)
        .ok_or_else(|| AppError::NotFound(format!("Challenge {} not found", req.challenge_id)))?;

    let session = ChallengeSession::start(
        challenge.clone(),
        state.catalog.seed(),
        state.config.query_timeout(),
    )
    .await?;
    let session_id = state.sessions.insert(session).await?;
    let active = state.sessions.len().await;
    debug!(%session_id, active, "Session stored");

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id,
            challenge: challenge.as_ref().clone(),
        }),
    ))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChallengeProgress>, AppError> {
    let session = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
    let progress = session.lock().await.progress();
    Ok(Json(progress))
}

/// POST /api/v1/sessions/:id/queries
pub async fn handle_submit_query(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitQueryRequest>,
) -> Result<Json<Submission>, AppError> {
    if req.query.trim().is_empty() {
        return Err(AppError::Validation("query must not be empty".to_string()));
    }

    let session = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;

    // Holding the lock for the whole submission keeps one query in flight
    // per session.
    let mut session = session.lock().await;
    let submission = session.submit(&req.query, &state.predicates).await;
    Ok(Json(submission))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}
