use super::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Seconds Telegram holds a `getUpdates` request open
const LONG_POLL_SECONDS: u64 = 30;

/// Telegram Bot API transport using long polling
pub struct TelegramMessenger {
    base_url: String,
    client: reqwest::Client,
    /// Next update id to request; acknowledges everything before it
    offset: AtomicI64,
}

impl TelegramMessenger {
    /// Create a new Telegram messenger for the given bot token.
    /// `api_url` is normally `https://api.telegram.org`.
    pub fn new(api_url: &str, token: &str) -> MessengerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(LONG_POLL_SECONDS + 10))
            .build()?;

        Ok(Self {
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            client,
            offset: AtomicI64::new(0),
        })
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: ChatId,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    #[serde(default)]
    message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    chat: Chat,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: ChatId,
}

impl<T> ApiResponse<T> {
    fn into_result(self) -> MessengerResult<T> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(MessengerError::ApiError(
                self.description
                    .unwrap_or_else(|| "Telegram returned no result".to_string()),
            )),
        }
    }
}

/// Extract text messages from updates and compute the next offset
fn collect_updates(updates: Vec<Update>, offset: i64) -> (Vec<InboundMessage>, i64) {
    let next_offset = updates
        .iter()
        .map(|u| u.update_id + 1)
        .max()
        .unwrap_or(offset)
        .max(offset);

    let messages = updates
        .into_iter()
        .filter_map(|u| u.message)
        .filter_map(|m| {
            m.text.map(|text| InboundMessage {
                chat_id: m.chat.id,
                text,
            })
        })
        .collect();

    (messages, next_offset)
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> MessengerResult<()> {
        let response: ApiResponse<serde_json::Value> = self
            .client
            .post(format!("{}/sendMessage", self.base_url))
            .json(&SendMessageRequest { chat_id, text })
            .send()
            .await?
            .json()
            .await?;

        response.into_result().map(|_| ())
    }

    async fn receive(&self) -> MessengerResult<Vec<InboundMessage>> {
        let offset = self.offset.load(Ordering::SeqCst);
        let response: ApiResponse<Vec<Update>> = self
            .client
            .get(format!("{}/getUpdates", self.base_url))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", LONG_POLL_SECONDS.to_string()),
                ("allowed_updates", r#"["message"]"#.to_string()),
            ])
            .send()
            .await?
            .json()
            .await?;

        let (messages, next_offset) = collect_updates(response.into_result()?, offset);
        self.offset.store(next_offset, Ordering::SeqCst);
        Ok(messages)
    }

    fn name(&self) -> &str {
        "telegram"
    }
}
