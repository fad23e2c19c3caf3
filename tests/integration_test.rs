use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::{routing::get, Router};
use futures::{SinkExt, StreamExt};
use quizdash::api;
use quizdash::bot::handle_inbound;
use quizdash::messenger::{InboundMessage, Messenger, MessengerError, MessengerResult};
use quizdash::protocol::{ClientMessage, ServerMessage};
use quizdash::state::{AppState, ROUND2_INSTRUCTION};
use quizdash::types::{AnswerValue, ChatId, QuestionKey, Round};
use quizdash::ws;
use quizdash::ws::handlers::handle_message;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tower::ServiceExt;

/// Messenger that records outgoing messages instead of sending them
struct RecordingMessenger {
    sent: mpsc::UnboundedSender<(ChatId, String)>,
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> MessengerResult<()> {
        self.sent
            .send((chat_id, text.to_string()))
            .map_err(|_| MessengerError::Closed)
    }

    async fn receive(&self) -> MessengerResult<Vec<InboundMessage>> {
        Err(MessengerError::Closed)
    }

    fn name(&self) -> &str {
        "Recording"
    }
}

fn recording_state() -> (AppState, mpsc::UnboundedReceiver<(ChatId, String)>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let state = AppState::default().with_messenger(Arc::new(RecordingMessenger { sent: tx }));
    (state, rx)
}

async fn say(state: &AppState, chat_id: ChatId, text: &str) -> String {
    handle_inbound(
        state,
        &InboundMessage {
            chat_id,
            text: text.to_string(),
        },
    )
    .await
    .expect("Expected a reply")
}

async fn join(state: &AppState, chat_id: ChatId, name: &str) {
    say(state, chat_id, "/start").await;
    let reply = say(state, chat_id, name).await;
    assert!(reply.contains(name), "Unexpected registration reply: {}", reply);
}

/// End-to-end flow: registration, a scored round 1 question, the switch to
/// round 2 and manual scoring there
#[tokio::test]
async fn test_full_game_flow() {
    let (state, mut sent) = recording_state();
    let mut events = state.broadcaster.subscribe();

    // 1. Two participants join through the chat bot
    join(&state, 1, "Alice").await;
    join(&state, 2, "Bob").await;

    for expected in ["Alice", "Bob"] {
        match events.recv().await {
            Ok(ServerMessage::NewParticipant { name, .. }) => assert_eq!(name, expected),
            other => panic!("Expected NewParticipant message, got {:?}", other),
        }
    }

    // 2. Both answer question 1 (correct option is A)
    let reply = say(&state, 1, "a").await;
    assert!(reply.contains("accepted"));
    let reply = say(&state, 2, "2").await;
    assert!(reply.contains("accepted"));

    match events.recv().await {
        Ok(ServerMessage::NewAnswer {
            answer_id,
            user_id,
            answer,
            is_correct,
            ..
        }) => {
            assert_eq!(answer_id, QuestionKey::new(Round::One, 0));
            assert_eq!(user_id, "tg_1");
            assert_eq!(answer, AnswerValue::Choice(0));
            assert!(is_correct);
        }
        other => panic!("Expected NewAnswer message, got {:?}", other),
    }

    // 3. A second answer from Alice is rejected
    let reply = say(&state, 1, "B").await;
    assert!(reply.contains("already answered"));

    // 4. Everyone answered, so the moderator can reveal
    assert!(handle_message(ClientMessage::RevealAnswers, &state)
        .await
        .is_none());
    let snapshot = state.snapshot().await;
    assert!(snapshot.state.answers_visible);
    assert!(snapshot.state.stats_visible);
    assert_eq!(snapshot.state.scores["tg_1"].total(), 1);
    assert_eq!(snapshot.state.scores["tg_2"].total(), 0);

    // 5. Moving on hides the answers again
    handle_message(ClientMessage::AdvanceQuestion, &state).await;
    let snapshot = state.snapshot().await;
    assert_eq!(snapshot.state.current_question, 1);
    assert!(!snapshot.state.answers_visible);

    // 6. Switching to round 2 sends the instructions to every chat once
    handle_message(ClientMessage::SwitchRound { round: Round::Two }, &state).await;

    let mut notified = Vec::new();
    for _ in 0..2 {
        let (chat_id, text) = tokio::time::timeout(Duration::from_secs(1), sent.recv())
            .await
            .expect("Timed out waiting for round 2 instructions")
            .expect("Messenger channel closed");
        assert_eq!(text, ROUND2_INSTRUCTION);
        notified.push(chat_id);
    }
    notified.sort();
    assert_eq!(notified, vec![1, 2]);

    handle_message(ClientMessage::SwitchRound { round: Round::One }, &state).await;
    handle_message(ClientMessage::SwitchRound { round: Round::Two }, &state).await;
    assert!(
        tokio::time::timeout(Duration::from_millis(100), sent.recv())
            .await
            .is_err(),
        "Round 2 instructions must only be sent once"
    );

    // 7. Free-text answers are recorded but scored by hand
    let reply = say(&state, 1, "This is fine").await;
    assert!(reply.contains("The host will check it"));
    let snapshot = state.snapshot().await;
    assert_eq!(snapshot.state.current_round, Round::Two);
    assert_eq!(snapshot.state.scores["tg_1"].round2(), 0);

    let response = handle_message(
        ClientMessage::AwardPoints {
            user_id: "tg_1".to_string(),
            points: 2,
        },
        &state,
    )
    .await;
    assert!(response.is_none());

    let snapshot = state.snapshot().await;
    let score = snapshot.state.scores["tg_1"];
    assert_eq!(score.round1(), 1);
    assert_eq!(score.round2(), 2);
    assert_eq!(score.total(), 3);
}

#[tokio::test]
async fn test_reveal_requires_every_answer() {
    let state = AppState::default();
    join(&state, 1, "Alice").await;
    join(&state, 2, "Bob").await;
    say(&state, 1, "C").await;

    match handle_message(ClientMessage::RevealAnswers, &state).await {
        Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "NOT_ALL_ANSWERED"),
        other => panic!("Expected Error message, got {:?}", other),
    }
    assert!(!state.snapshot().await.state.answers_visible);

    say(&state, 2, "D").await;
    assert!(handle_message(ClientMessage::RevealAnswers, &state)
        .await
        .is_none());
    assert!(state.snapshot().await.state.answers_visible);
}

#[tokio::test]
async fn test_last_question_reveals_round_statistics() {
    let state = AppState::default();
    join(&state, 1, "Alice").await;

    for _ in 0..11 {
        handle_message(ClientMessage::AdvanceQuestion, &state).await;
    }
    assert_eq!(state.snapshot().await.state.current_question, 11);

    let mut events = state.broadcaster.subscribe();
    handle_message(ClientMessage::AdvanceQuestion, &state).await;

    assert!(matches!(
        events.recv().await,
        Ok(ServerMessage::GameState { .. })
    ));
    match events.recv().await {
        Ok(ServerMessage::RoundStatistics { stats }) => {
            assert_eq!(stats["tg_1"].name, "Alice");
        }
        other => panic!("Expected RoundStatistics message, got {:?}", other),
    }

    let snapshot = state.snapshot().await;
    assert_eq!(snapshot.state.current_question, 11);
    assert!(snapshot.state.stats_visible);
    assert!(snapshot.state.round_statistics.is_some());
}

#[tokio::test]
async fn test_reset_round_clears_participants() {
    let state = AppState::default();
    join(&state, 1, "Alice").await;
    say(&state, 1, "A").await;
    handle_message(ClientMessage::AdvanceQuestion, &state).await;

    handle_message(ClientMessage::ResetRound, &state).await;

    let snapshot = state.snapshot().await;
    assert!(snapshot.state.participants.is_empty());
    assert!(snapshot.state.answers.is_empty());
    assert!(snapshot.state.scores.is_empty());
    assert_eq!(snapshot.state.current_question, 0);

    // Former participants have to register again
    let reply = say(&state, 1, "A").await;
    assert!(reply.contains("Great, A!"));
}

async fn get_json(state: &AppState, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = api::router()
        .with_state(state.clone())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_read_only_api() {
    let state = AppState::default();
    join(&state, 1, "Alice").await;
    say(&state, 1, "1").await;

    let (status, json) = get_json(&state, "/state").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["current_round"], 1);
    assert_eq!(json["current_question"], 0);
    assert_eq!(json["participants"]["tg_1"]["name"], "Alice");

    let (status, json) = get_json(&state, "/answers/current").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["answers"][0]["user_name"], "Alice");
    assert_eq!(json["answers"][0]["is_correct"], true);

    let (_, json) = get_json(&state, "/stats/1/5").await;
    assert_eq!(json["answers"].as_array().map(Vec::len), Some(0));

    let (_, json) = get_json(&state, "/participants").await;
    assert_eq!(json["participants"][0]["user_id"], "tg_1");
    assert_eq!(json["participants"][0]["score"], 1);

    let (_, json) = get_json(&state, "/scores").await;
    assert_eq!(json["scores"]["tg_1"]["total"], 1);
    assert_eq!(json["scores"]["tg_1"]["round1"], 1);

    let (status, _) = get_json(&state, "/stats/3/0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

async fn spawn_server(state: AppState) -> SocketAddr {
    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Next JSON text frame, skipping control frames
async fn next_json<S>(socket: &mut S) -> serde_json::Value
where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(2), socket.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Socket closed")
            .expect("WebSocket error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

#[tokio::test]
async fn test_websocket_observer() {
    let state = AppState::default();
    join(&state, 1, "Alice").await;
    let addr = spawn_server(state.clone()).await;

    let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
        .await
        .unwrap();

    // Full snapshot as soon as the observer connects
    let welcome = next_json(&mut socket).await;
    assert_eq!(welcome["t"], "game_state");
    assert_eq!(welcome["current_question"], 0);
    assert_eq!(welcome["participants"]["tg_1"]["name"], "Alice");

    // Garbage gets a targeted parse error
    socket
        .send(Message::Text("definitely not json".into()))
        .await
        .unwrap();
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["t"], "error");
    assert_eq!(reply["code"], "PARSE_ERROR");

    // Commands come back as broadcast state
    socket
        .send(Message::Text(r#"{"t":"advance_question"}"#.into()))
        .await
        .unwrap();
    let update = next_json(&mut socket).await;
    assert_eq!(update["t"], "game_state");
    assert_eq!(update["current_question"], 1);

    // Changes made elsewhere reach the observer too
    say(&state, 1, "B").await;
    let event = next_json(&mut socket).await;
    assert_eq!(event["t"], "new_answer");
    assert_eq!(event["user_id"], "tg_1");
}
