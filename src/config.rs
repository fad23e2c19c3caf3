//! Server configuration from environment variables

use crate::types::GameConfig;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Token value shipped in example `.env` files; treated as "not configured"
const PLACEHOLDER_BOT_TOKEN: &str = "YOUR_BOT_TOKEN";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub questions_dir: PathBuf,
    pub static_dir: PathBuf,
    pub uploads_dir: PathBuf,
    /// Telegram bot token (None = bot disabled)
    pub telegram_token: Option<String>,
    pub telegram_api_url: String,
    pub game: GameConfig,
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn env_parse<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env_string(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}

impl ServerConfig {
    /// Load config from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let ip: IpAddr = env_parse("BIND_ADDR", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;
        let port: u16 = env_parse("PORT", 3000)?;

        let telegram_token =
            env_string("TELEGRAM_BOT_TOKEN").filter(|token| token != PLACEHOLDER_BOT_TOKEN);

        let defaults = GameConfig::default();
        let game = GameConfig {
            round1_questions: env_parse("ROUND1_QUESTIONS", defaults.round1_questions)?,
            round2_questions: env_parse("ROUND2_QUESTIONS", defaults.round2_questions)?,
        };

        Ok(Self {
            bind_addr: SocketAddr::new(ip, port),
            questions_dir: env_string("QUESTIONS_DIR")
                .unwrap_or_else(|| "questions".to_string())
                .into(),
            static_dir: env_string("STATIC_DIR")
                .unwrap_or_else(|| "public".to_string())
                .into(),
            uploads_dir: env_string("UPLOADS_DIR")
                .unwrap_or_else(|| "uploads".to_string())
                .into(),
            telegram_token,
            telegram_api_url: env_string("TELEGRAM_API_URL")
                .unwrap_or_else(|| "https://api.telegram.org".to_string()),
            game,
        })
    }
}
