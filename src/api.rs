//! Read-only HTTP API for dashboards and integrations.
//!
//! Nothing here mutates the game; moderator commands go through the
//! WebSocket channel.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::protocol::{GameSnapshot, ParticipantSummary, ScoreEntry};
use crate::state::AppState;
use crate::types::{AnswerRecord, ParticipantId, QuestionKey, Round};

#[derive(Debug, Clone, Serialize)]
pub struct AnswersResponse {
    pub answers: Vec<AnswerRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantsResponse {
    pub participants: Vec<ParticipantSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoresResponse {
    pub scores: BTreeMap<ParticipantId, ScoreEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaResponse {
    pub media_url: Option<String>,
}

/// Routes mounted under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/state", get(get_state))
        .route("/answers/current", get(current_answers))
        .route("/stats/{round}/{question}", get(question_answers))
        .route("/participants", get(participants))
        .route("/scores", get(scores))
        .route("/questions/{round}/{index}/media", get(question_media))
}

fn parse_round(round: u8) -> Result<Round, Response> {
    Round::try_from(round).map_err(|e| (StatusCode::BAD_REQUEST, e).into_response())
}

/// Full game state snapshot.
///
/// GET /api/state
pub async fn get_state(State(state): State<AppState>) -> Json<GameSnapshot> {
    Json(state.snapshot().await)
}

/// Answers for the active question.
///
/// GET /api/answers/current
pub async fn current_answers(State(state): State<AppState>) -> Json<AnswersResponse> {
    Json(AnswersResponse {
        answers: state.current_answers().await,
    })
}

/// Answers for a given question. Unknown questions yield an empty list.
///
/// GET /api/stats/{round}/{question}
pub async fn question_answers(
    State(state): State<AppState>,
    Path((round, question)): Path<(u8, usize)>,
) -> Result<Json<AnswersResponse>, Response> {
    let round = parse_round(round)?;
    let answers = state.answers_for(QuestionKey::new(round, question)).await;
    Ok(Json(AnswersResponse { answers }))
}

/// Registered participants with their total score.
///
/// GET /api/participants
pub async fn participants(State(state): State<AppState>) -> Json<ParticipantsResponse> {
    Json(ParticipantsResponse {
        participants: state.participant_roster().await,
    })
}

/// GET /api/scores
pub async fn scores(State(state): State<AppState>) -> Json<ScoresResponse> {
    Json(ScoresResponse {
        scores: state.score_table().await,
    })
}

/// GET /api/questions/{round}/{index}/media
pub async fn question_media(
    State(state): State<AppState>,
    Path((round, index)): Path<(u8, usize)>,
) -> Result<Json<MediaResponse>, Response> {
    let round = parse_round(round)?;
    Ok(Json(MediaResponse {
        media_url: state.question_media(round, index),
    }))
}
