//! WebSocket command dispatch
//!
//! Successful commands answer through the broadcast channel, so only
//! rejections and query replies come back as a direct response.

use crate::error::CommandError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;

fn command_error(e: CommandError) -> ServerMessage {
    tracing::info!("Command rejected: {}", e);
    ServerMessage::Error {
        code: e.code().to_string(),
        msg: e.to_string(),
    }
}

/// Handle a client message and return the targeted response, if any
pub async fn handle_message(msg: ClientMessage, state: &AppState) -> Option<ServerMessage> {
    match msg {
        ClientMessage::AdvanceQuestion => {
            state.advance_question().await;
            None
        }

        ClientMessage::RetreatQuestion => state.retreat_question().await.err().map(command_error),

        ClientMessage::SwitchRound { round } => {
            let notified = state.switch_round(round).await;
            if !notified.is_empty() {
                tracing::info!("Round {} instructions queued for {} chats", round, notified.len());
            }
            None
        }

        ClientMessage::RevealAnswers => state.reveal_answers().await.err().map(command_error),

        ClientMessage::HideAnswers => {
            state.hide_answers().await;
            None
        }

        ClientMessage::ResetRound => {
            state.reset_round().await;
            None
        }

        ClientMessage::AwardPoints { user_id, points } => state
            .award_points(&user_id, points)
            .await
            .err()
            .map(command_error),

        ClientMessage::RecomputeStatistics => {
            state.recompute_statistics().await.err().map(command_error)
        }

        ClientMessage::GetQuestionMedia {
            round,
            question_index,
        } => Some(ServerMessage::QuestionMedia {
            round,
            question_index,
            media_url: state.question_media(round, question_index),
        }),
    }
}
