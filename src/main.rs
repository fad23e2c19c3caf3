use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quizdash::{
    api, bot,
    config::ServerConfig,
    messenger::{Messenger, TelegramMessenger},
    questions::QuestionBank,
    state::AppState,
    types::Round,
    ws,
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quizdash=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting quizdash...");

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let questions = QuestionBank::load_or_placeholder(&config.questions_dir);
    for round in [Round::One, Round::Two] {
        let configured = config.game.round_length(round);
        if questions.len(round) < configured {
            tracing::warn!(
                "Round {} has {} questions but is configured for {}",
                round,
                questions.len(round),
                configured
            );
        }
    }
    let mut state = AppState::new(questions, config.game.clone());

    // Chat bot is optional; the dashboard works without it
    match &config.telegram_token {
        Some(token) => match TelegramMessenger::new(&config.telegram_api_url, token) {
            Ok(telegram) => {
                let messenger: Arc<dyn Messenger> = Arc::new(telegram);
                state = state.with_messenger(messenger.clone());
                bot::spawn_inbound_loop(state.clone(), messenger);
                tracing::info!("Telegram bot enabled");
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to initialize Telegram bot: {}. Answers will not be collected.",
                    e
                );
            }
        },
        None => {
            tracing::warn!("TELEGRAM_BOT_TOKEN not set. Telegram bot is disabled.");
        }
    }

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/api", api::router())
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("Listening on http://{}", config.bind_addr);

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.bind_addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
