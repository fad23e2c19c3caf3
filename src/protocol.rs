use crate::types::*;
use serde::{Deserialize, Serialize};

fn default_points() -> i64 {
    1
}

/// Moderator commands sent over the WebSocket channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    AdvanceQuestion,
    RetreatQuestion,
    SwitchRound {
        round: Round,
    },
    RevealAnswers,
    HideAnswers,
    ResetRound,
    AwardPoints {
        user_id: ParticipantId,
        #[serde(default = "default_points")]
        points: i64,
    },
    RecomputeStatistics,
    GetQuestionMedia {
        round: Round,
        question_index: usize,
    },
}

/// Events pushed to observers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full state replication, sent after every command and on connect
    GameState {
        #[serde(flatten)]
        snapshot: GameSnapshot,
    },
    NewParticipant {
        user_id: ParticipantId,
        name: String,
        color: String,
    },
    NewAnswer {
        answer_id: QuestionKey,
        user_id: ParticipantId,
        answer: AnswerValue,
        is_correct: bool,
        user_name: String,
        round: Round,
    },
    RoundStatistics {
        stats: RoundStatistics,
    },
    /// Reply to `get_question_media` (requesting observer only)
    QuestionMedia {
        round: Round,
        question_index: usize,
        media_url: Option<String>,
    },
    /// Sent to the requesting observer only, never broadcast
    Error {
        code: String,
        msg: String,
    },
}

/// Game state plus what a presenter needs to render the active question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSnapshot {
    #[serde(flatten)]
    pub state: GameState,
    pub round_length: usize,
    pub question: Option<Question>,
}

/// Participant row for the read-only roster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParticipantSummary {
    pub user_id: ParticipantId,
    pub name: String,
    pub color: Option<String>,
    pub score: i64,
}

/// Score row for the read-only score table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreEntry {
    pub name: String,
    pub total: i64,
    pub round1: i64,
    pub round2: i64,
}
