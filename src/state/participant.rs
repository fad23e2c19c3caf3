use super::AppState;
use crate::error::RegistrationError;
use crate::protocol::ServerMessage;
use crate::types::*;
use rand::seq::IndexedRandom;

/// Display colours handed out to participants at registration
pub const PARTICIPANT_COLORS: &[&str] = &[
    "#FF6B6B", "#4ECDC4", "#FFD166", "#06D6A0", "#118AB2", "#7209B7", "#3A86FF", "#FB5607",
    "#8338EC", "#FF006E", "#FFBE0B",
];

/// Participant identity for a chat
pub fn participant_id_for_chat(chat_id: ChatId) -> ParticipantId {
    format!("tg_{}", chat_id)
}

fn random_color() -> String {
    PARTICIPANT_COLORS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or("#FF6B6B")
        .to_string()
}

/// Result of a successful registration
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub participant_id: ParticipantId,
    pub name: String,
    pub color: String,
}

impl AppState {
    /// Handle a chat's `/start`: create an unregistered participant entry.
    ///
    /// Returns the existing participant if it is already registered.
    pub async fn start_registration(&self, chat_id: ChatId) -> Participant {
        let id = participant_id_for_chat(chat_id);
        let mut game = self.game.write().await;

        let participant = game
            .participants
            .entry(id.clone())
            .or_insert_with(|| Participant {
                id: id.clone(),
                chat_id: Some(chat_id),
                name: None,
                color: None,
                registered: false,
            });
        tracing::info!("Registration started for {}", id);
        participant.clone()
    }

    /// Register the participant behind a chat with a display name
    pub async fn register_participant(
        &self,
        chat_id: ChatId,
        name: &str,
    ) -> Result<Registration, RegistrationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistrationError::EmptyName);
        }

        let registration = {
            let mut game = self.game.write().await;
            let id = participant_id_for_chat(chat_id);

            if let Some(existing) = game.participants.get(&id) {
                if existing.registered {
                    return Err(RegistrationError::AlreadyRegistered(
                        existing.name.clone().unwrap_or_default(),
                    ));
                }
            }

            let color = random_color();
            game.participants.insert(
                id.clone(),
                Participant {
                    id: id.clone(),
                    chat_id: Some(chat_id),
                    name: Some(name.to_string()),
                    color: Some(color.clone()),
                    registered: true,
                },
            );
            game.scores.insert(id.clone(), Score::default());

            Registration {
                participant_id: id,
                name: name.to_string(),
                color,
            }
        };

        tracing::info!(
            "Registered participant {} as {}",
            registration.participant_id,
            registration.name
        );
        self.broadcast_to_all(ServerMessage::NewParticipant {
            user_id: registration.participant_id.clone(),
            name: registration.name.clone(),
            color: registration.color.clone(),
        });

        Ok(registration)
    }

    pub async fn get_participant(&self, participant_id: &str) -> Option<Participant> {
        self.game
            .read()
            .await
            .participants
            .get(participant_id)
            .cloned()
    }
}
