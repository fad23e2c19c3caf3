//! Chat channel participants answer through
//!
//! The game only needs two operations from a chat platform: deliver text to
//! one chat and fetch newly arrived messages. `TelegramMessenger` implements
//! them over the Telegram Bot API.

mod telegram;

use crate::types::ChatId;
use async_trait::async_trait;

pub use telegram::TelegramMessenger;

/// Result type for messenger operations
pub type MessengerResult<T> = Result<T, MessengerError>;

#[derive(Debug, thiserror::Error)]
pub enum MessengerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Messenger closed")]
    Closed,
}

/// A text message from a participant
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub text: String,
}

/// Trait that all chat transports must implement
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a text message to a single chat
    async fn send_text(&self, chat_id: ChatId, text: &str) -> MessengerResult<()>;

    /// Wait for the next batch of inbound messages.
    ///
    /// May return an empty batch when nothing arrived before the transport's
    /// poll timeout.
    async fn receive(&self) -> MessengerResult<Vec<InboundMessage>>;

    /// Get the name of this transport
    fn name(&self) -> &str;
}
