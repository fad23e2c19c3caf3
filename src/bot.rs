//! Routing of inbound chat messages
//!
//! A participant's first plain-text message is their display name; every
//! later message is an answer to the active question. Replies go back to
//! the sending chat only.

use crate::answer::option_letter;
use crate::error::{IngestError, RegistrationError};
use crate::messenger::{InboundMessage, Messenger};
use crate::state::AppState;
use crate::types::*;
use std::sync::Arc;
use std::time::Duration;

/// Delay before polling again after a transport error
const RETRY_DELAY: Duration = Duration::from_secs(5);

const WELCOME: &str = "Hi! 👋\n\nWelcome to the quiz!\n\nPlease send your name to take part (first name only):";

/// Reply text for a rejected answer
fn rejection_text(error: &IngestError) -> &'static str {
    match error {
        IngestError::NotRegistered => "You are not registered yet. Send /start to join.",
        IngestError::NoActiveQuestion => "Question not found. Please wait for the next question.",
        IngestError::Duplicate => "You have already answered this question! Wait for the next one.",
        IngestError::InvalidFormat => {
            "Invalid answer format. Send the option number (1, 2, 3, 4) or letter (A, B, C, D)"
        }
        IngestError::EmptyAnswer => "Please send your answer as text.",
    }
}

fn registered_text(name: &str) -> String {
    format!(
        "Great, {}! ✅\nYou are registered.\n\n\
         Wait for the questions and send your answers:\n\
         • Warm-up round: 1, 2, 3, 4 or A, B, C, D\n\
         • Picture round: a text answer\n\n\
         Good luck! 🍀",
        name
    )
}

fn accepted_text(answer: &AnswerValue) -> String {
    match answer {
        AnswerValue::Choice(index) => format!(
            "Your answer \"{}\" has been accepted! ✅\n\n\
             Correct answers are shown when the question ends.",
            option_letter(*index).unwrap_or('?')
        ),
        AnswerValue::Text(text) => format!(
            "Your answer \"{}\" has been accepted! ✅\n\n\
             The host will check it and award points.",
            text
        ),
    }
}

/// Route one inbound message and return the reply for the sender, if any
pub async fn handle_inbound(state: &AppState, msg: &InboundMessage) -> Option<String> {
    let text = msg.text.trim();
    let participant_id = crate::state::participant_id_for_chat(msg.chat_id);
    tracing::debug!("Inbound message from {}: {}", participant_id, text);

    if let Some(command) = text.strip_prefix('/') {
        let command = command.split_whitespace().next().unwrap_or_default();
        // Group chats address commands as `/start@BotName`
        let command = command.split_once('@').map_or(command, |(name, _)| name);
        return match command {
            "start" => {
                let participant = state.start_registration(msg.chat_id).await;
                if participant.registered {
                    Some(format!(
                        "You are already registered as {}. Wait for the next question!",
                        participant.name.unwrap_or_default()
                    ))
                } else {
                    Some(WELCOME.to_string())
                }
            }
            "status" => Some(status_text(state, &participant_id).await),
            _ => None,
        };
    }

    let registered = state
        .get_participant(&participant_id)
        .await
        .is_some_and(|p| p.registered);

    if !registered {
        return match state.register_participant(msg.chat_id, text).await {
            Ok(registration) => Some(registered_text(&registration.name)),
            Err(RegistrationError::EmptyName) => Some(WELCOME.to_string()),
            Err(e @ RegistrationError::AlreadyRegistered(_)) => Some(format!("You are {}.", e)),
        };
    }

    match state.submit_answer(&participant_id, text).await {
        Ok(accepted) => Some(accepted_text(&accepted.record.answer)),
        Err(e) => {
            tracing::info!("Answer from {} rejected: {}", participant_id, e);
            Some(rejection_text(&e).to_string())
        }
    }
}

async fn status_text(state: &AppState, participant_id: &str) -> String {
    let game = state.game.read().await;
    match game.participants.get(participant_id) {
        Some(p) if p.registered => {
            let score = game.scores.get(participant_id).copied().unwrap_or_default();
            format!(
                "📊 Your status:\nName: {}\nScore: {} (round 1: {}, round 2: {})",
                p.name.as_deref().unwrap_or_default(),
                score.total(),
                score.round1(),
                score.round2()
            )
        }
        _ => "You are not registered. Use /start".to_string(),
    }
}

/// Send a reply without holding up the messages queued behind it
fn spawn_reply(state: &AppState, chat_id: ChatId, reply: String) {
    let state = state.clone();
    tokio::spawn(async move {
        state.notify_chat(chat_id, &reply).await;
    });
}

/// Spawn a background task that feeds chat messages into the game.
///
/// Messages are handled one at a time in arrival order; replies are sent
/// from their own tasks.
pub fn spawn_inbound_loop(state: AppState, messenger: Arc<dyn Messenger>) {
    tokio::spawn(async move {
        tracing::info!("Listening for {} messages", messenger.name());

        loop {
            let batch = match messenger.receive().await {
                Ok(batch) => batch,
                Err(crate::messenger::MessengerError::Closed) => {
                    tracing::info!("{} messenger closed", messenger.name());
                    break;
                }
                Err(e) => {
                    tracing::warn!("Failed to receive {} messages: {}", messenger.name(), e);
                    tokio::time::sleep(RETRY_DELAY).await;
                    continue;
                }
            };

            for msg in batch {
                if let Some(reply) = handle_inbound(&state, &msg).await {
                    spawn_reply(&state, msg.chat_id, reply);
                }
            }
        }
    });
}
