use super::AppState;
use crate::answer::parse_answer;
use crate::error::IngestError;
use crate::protocol::ServerMessage;
use crate::types::*;

/// Points for a correct round 1 answer
const CORRECT_ANSWER_POINTS: i64 = 1;

/// An answer that passed validation and was recorded
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedAnswer {
    pub answer_id: QuestionKey,
    pub participant_id: ParticipantId,
    pub record: AnswerRecord,
}

impl AppState {
    /// Validate, record and score an answer for the active question.
    ///
    /// Checks run in a fixed order (registration, active question,
    /// duplicate, format) and a rejection leaves the state untouched.
    pub async fn submit_answer(
        &self,
        participant_id: &str,
        text: &str,
    ) -> Result<AcceptedAnswer, IngestError> {
        let accepted = {
            let mut game = self.game.write().await;

            let user_name = match game.participants.get(participant_id) {
                Some(p) if p.registered => p.name.clone().unwrap_or_default(),
                _ => return Err(IngestError::NotRegistered),
            };

            let key = game.cursor();
            let question = self
                .questions
                .get(key.round, key.question)
                .ok_or(IngestError::NoActiveQuestion)?;

            if game
                .answers
                .get(&key)
                .is_some_and(|answers| answers.contains_key(participant_id))
            {
                return Err(IngestError::Duplicate);
            }

            let (answer, is_correct) = if key.round.is_auto_scored() {
                let index = parse_answer(text).ok_or(IngestError::InvalidFormat)?;
                (AnswerValue::Choice(index), question.correct == Some(index))
            } else {
                let text = text.trim();
                if text.is_empty() {
                    return Err(IngestError::EmptyAnswer);
                }
                (AnswerValue::Text(text.to_string()), false)
            };

            let record = AnswerRecord {
                answer,
                is_correct,
                user_name,
                timestamp: chrono::Utc::now().to_rfc3339(),
                round: key.round,
            };

            game.answers
                .entry(key)
                .or_default()
                .insert(participant_id.to_string(), record.clone());

            if is_correct {
                game.scores
                    .entry(participant_id.to_string())
                    .or_default()
                    .add(key.round, CORRECT_ANSWER_POINTS);
            }

            AcceptedAnswer {
                answer_id: key,
                participant_id: participant_id.to_string(),
                record,
            }
        };

        tracing::info!(
            "Answer from {}: {:?} (round {}, correct: {})",
            accepted.record.user_name,
            accepted.record.answer,
            accepted.record.round,
            accepted.record.is_correct
        );

        self.broadcast_to_all(ServerMessage::NewAnswer {
            answer_id: accepted.answer_id,
            user_id: accepted.participant_id.clone(),
            answer: accepted.record.answer.clone(),
            is_correct: accepted.record.is_correct,
            user_name: accepted.record.user_name.clone(),
            round: accepted.record.round,
        });

        Ok(accepted)
    }
}
