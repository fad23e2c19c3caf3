//! Moderator command processor
//!
//! Each command validates its precondition and mutates the game under a
//! single write lock, then publishes the new full state once the lock is
//! released. A rejected command changes nothing and publishes nothing.

use super::{calculate_round_statistics, AppState};
use crate::error::CommandError;
use crate::protocol::ServerMessage;
use crate::types::*;

/// Sent once per session to every registered chat when round 2 starts
pub const ROUND2_INSTRUCTION: &str = "🎨 The picture round is starting!\n\n\
    You will see a meme on the screen.\n\
    Reply with the NAME of the meme as text.\n\n\
    Example: \"Distracted boyfriend\" or \"This is fine\"\n\n\
    The host checks answers by hand and awards points.";

impl AppState {
    fn is_last_question(&self, game: &GameState) -> bool {
        game.current_question == self.config.last_index(game.current_round)
    }

    /// Recompute statistics into the game and return a copy for publishing
    fn refresh_statistics(game: &mut GameState) -> RoundStatistics {
        let stats = calculate_round_statistics(game);
        game.round_statistics = Some(stats.clone());
        stats
    }

    /// Move to the next question. On the last question of the round the
    /// cursor stays put and answers plus round statistics are revealed
    /// instead.
    pub async fn advance_question(&self) {
        let (snapshot, stats) = {
            let mut game = self.game.write().await;
            let last = self.config.last_index(game.current_round);

            let stats = if game.current_question < last {
                game.current_question += 1;
                game.clear_visibility();
                game.round_statistics = None;
                tracing::info!("Advanced to question {}", game.current_question + 1);
                None
            } else {
                game.stats_visible = true;
                game.answers_visible = true;
                tracing::info!(
                    "Last question of round {}, revealing statistics",
                    game.current_round
                );
                Some(Self::refresh_statistics(&mut game))
            };
            (self.snapshot_of(&game), stats)
        };

        self.publish_snapshot(snapshot);
        if let Some(stats) = stats {
            self.broadcast_to_all(ServerMessage::RoundStatistics { stats });
        }
    }

    pub async fn retreat_question(&self) -> Result<(), CommandError> {
        let snapshot = {
            let mut game = self.game.write().await;
            if game.current_question == 0 {
                return Err(CommandError::AtFirstQuestion);
            }
            game.current_question -= 1;
            game.clear_visibility();
            tracing::info!("Went back to question {}", game.current_question + 1);
            self.snapshot_of(&game)
        };

        self.publish_snapshot(snapshot);
        Ok(())
    }

    /// Switch to a round, starting at its first question with a fresh
    /// answer log.
    ///
    /// With a messenger configured, the first switch into round 2 sends the
    /// round instructions to every registered chat. Returns the chats being
    /// notified.
    pub async fn switch_round(&self, round: Round) -> Vec<ChatId> {
        let (snapshot, recipients) = {
            let mut game = self.game.write().await;
            game.current_round = round;
            game.current_question = 0;
            game.answers.clear();
            game.clear_visibility();
            game.round_statistics = None;

            let notify = round == Round::Two
                && self.messenger.is_some()
                && !game.round2_notification_sent;
            let recipients = if notify {
                game.round2_notification_sent = true;
                game.participants
                    .values()
                    .filter(|p| p.registered)
                    .filter_map(|p| p.chat_id)
                    .collect()
            } else {
                Vec::new()
            };

            tracing::info!("Switched to round {}", round);
            (self.snapshot_of(&game), recipients)
        };

        self.publish_snapshot(snapshot);
        if !recipients.is_empty() {
            self.spawn_notify_all(recipients.clone(), ROUND2_INSTRUCTION);
        }
        recipients
    }

    /// Fire-and-forget delivery of one text to many chats
    fn spawn_notify_all(&self, chat_ids: Vec<ChatId>, text: &'static str) {
        let state = self.clone();
        tokio::spawn(async move {
            for chat_id in chat_ids {
                state.notify_chat(chat_id, text).await;
            }
        });
    }

    /// Show the answers for the current question. Requires every registered
    /// participant to have answered.
    pub async fn reveal_answers(&self) -> Result<(), CommandError> {
        let (snapshot, stats) = {
            let mut game = self.game.write().await;
            let registered = game.registered_count();
            let answered = game.current_answers().map_or(0, |a| a.len());

            if registered == 0 || answered != registered {
                tracing::info!("Reveal refused: {}/{} answered", answered, registered);
                return Err(CommandError::NotAllAnswered {
                    answered,
                    registered,
                });
            }

            game.answers_visible = true;
            game.stats_visible = true;
            let stats = self
                .is_last_question(&game)
                .then(|| Self::refresh_statistics(&mut game));
            tracing::info!("Revealed answers for question {}", game.current_question + 1);
            (self.snapshot_of(&game), stats)
        };

        if let Some(stats) = stats {
            self.broadcast_to_all(ServerMessage::RoundStatistics { stats });
        }
        self.publish_snapshot(snapshot);
        Ok(())
    }

    /// Hide answers. Statistics stay pinned on the last question.
    pub async fn hide_answers(&self) {
        let snapshot = {
            let mut game = self.game.write().await;
            game.clear_visibility();
            if !self.is_last_question(&game) {
                game.round_statistics = None;
            }
            tracing::info!("Answers hidden");
            self.snapshot_of(&game)
        };

        self.publish_snapshot(snapshot);
    }

    /// Clear participants, answers and scores. The current round is kept.
    pub async fn reset_round(&self) {
        let snapshot = {
            let mut game = self.game.write().await;
            game.participants.clear();
            game.answers.clear();
            game.scores.clear();
            game.current_question = 0;
            game.clear_visibility();
            game.round_statistics = None;
            game.round2_notification_sent = false;
            tracing::info!("Round reset");
            self.snapshot_of(&game)
        };

        self.publish_snapshot(snapshot);
    }

    /// Add points (possibly negative) to a participant's score for the
    /// current round. Returns the updated score.
    pub async fn award_points(
        &self,
        participant_id: &str,
        points: i64,
    ) -> Result<Score, CommandError> {
        let (snapshot, stats, score) = {
            let mut game = self.game.write().await;
            if !game.is_registered(participant_id) {
                return Err(CommandError::UnknownParticipant(participant_id.to_string()));
            }

            let round = game.current_round;
            let score = {
                let entry = game.scores.entry(participant_id.to_string()).or_default();
                entry.add(round, points);
                *entry
            };

            let stats = game
                .round_statistics
                .is_some()
                .then(|| Self::refresh_statistics(&mut game));

            tracing::info!(
                "Awarded {} points to {} (round {})",
                points,
                participant_id,
                round
            );
            (self.snapshot_of(&game), stats, score)
        };

        if let Some(stats) = stats {
            self.broadcast_to_all(ServerMessage::RoundStatistics { stats });
        }
        self.publish_snapshot(snapshot);
        Ok(score)
    }

    /// Recompute the cached round statistics and publish them
    pub async fn recompute_statistics(&self) -> Result<RoundStatistics, CommandError> {
        let (snapshot, stats) = {
            let mut game = self.game.write().await;
            if game.round_statistics.is_none() {
                return Err(CommandError::NoStatistics);
            }
            let stats = Self::refresh_statistics(&mut game);
            tracing::info!("Round statistics recomputed");
            (self.snapshot_of(&game), stats)
        };

        self.broadcast_to_all(ServerMessage::RoundStatistics {
            stats: stats.clone(),
        });
        self.publish_snapshot(snapshot);
        Ok(stats)
    }

    /// Media URL for a question, if it has one
    pub fn question_media(&self, round: Round, question_index: usize) -> Option<String> {
        self.questions
            .get(round, question_index)
            .and_then(|q| q.media_url())
            .map(str::to_string)
    }
}
