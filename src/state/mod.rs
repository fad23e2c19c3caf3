mod commands;
mod ingest;
mod participant;
mod query;
mod stats;

pub use commands::ROUND2_INSTRUCTION;
pub use ingest::AcceptedAnswer;
pub use participant::{participant_id_for_chat, Registration, PARTICIPANT_COLORS};
pub use stats::calculate_round_statistics;

use crate::broadcast::Broadcaster;
use crate::messenger::Messenger;
use crate::protocol::{GameSnapshot, ServerMessage};
use crate::questions::QuestionBank;
use crate::types::*;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state
///
/// Every command and answer takes the `game` write lock for its whole
/// check-and-mutate step, so mutations never interleave. Events are
/// published only after the lock is released.
#[derive(Clone)]
pub struct AppState {
    pub game: Arc<RwLock<GameState>>,
    pub questions: Arc<QuestionBank>,
    pub config: GameConfig,
    /// Fan-out to presenter displays
    pub broadcaster: Broadcaster,
    /// Chat transport for participant replies (None = bot disabled)
    pub messenger: Option<Arc<dyn Messenger>>,
}

impl AppState {
    pub fn new(questions: QuestionBank, config: GameConfig) -> Self {
        Self {
            game: Arc::new(RwLock::new(GameState::default())),
            questions: Arc::new(questions),
            config,
            broadcaster: Broadcaster::default(),
            messenger: None,
        }
    }

    pub fn with_messenger(mut self, messenger: Arc<dyn Messenger>) -> Self {
        self.messenger = Some(messenger);
        self
    }

    /// Build a snapshot from already-locked state
    fn snapshot_of(&self, game: &GameState) -> GameSnapshot {
        GameSnapshot {
            state: game.clone(),
            round_length: self.config.round_length(game.current_round),
            question: self
                .questions
                .get(game.current_round, game.current_question)
                .cloned(),
        }
    }

    /// Current full-state snapshot
    pub async fn snapshot(&self) -> GameSnapshot {
        let game = self.game.read().await;
        self.snapshot_of(&game)
    }

    pub fn broadcast_to_all(&self, msg: ServerMessage) {
        self.broadcaster.publish(msg);
    }

    /// Publish a full-state update built from an already-taken snapshot
    fn publish_snapshot(&self, snapshot: GameSnapshot) {
        self.broadcast_to_all(ServerMessage::GameState { snapshot });
    }

    /// Deliver one chat message, logging instead of failing
    pub async fn notify_chat(&self, chat_id: ChatId, text: &str) {
        let Some(messenger) = &self.messenger else {
            return;
        };
        if let Err(e) = messenger.send_text(chat_id, text).await {
            tracing::warn!("Failed to send message to chat {}: {}", chat_id, e);
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(QuestionBank::placeholder(), GameConfig::default())
    }
}
