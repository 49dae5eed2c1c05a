//! Axum route handlers for the Challenge API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::catalog::schema::{Difficulty, SqlChallenge};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ChallengeSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
}

impl From<&SqlChallenge> for ChallengeSummary {
    fn from(c: &SqlChallenge) -> Self {
        Self {
            id: c.id.clone(),
            title: c.title.clone(),
            description: c.description.clone(),
            difficulty: c.difficulty,
        }
    }
}

/// GET /api/v1/challenges
pub async fn handle_list_challenges(State(state): State<AppState>) -> Json<Vec<ChallengeSummary>> {
    Json(
        state
            .catalog
            .challenges()
            .iter()
            .map(|c| ChallengeSummary::from(c.as_ref()))
            .collect(),
    )
}

/// GET /api/v1/challenges/:id
pub async fn handle_get_challenge(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SqlChallenge>, AppError> {
    let challenge = state
        .catalog
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("Challenge {id} not found")))?;
    Ok(Json(challenge.as_ref().clone()))
}
