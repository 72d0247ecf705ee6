//! WebSocket chat endpoint with word-paced answer streaming
//!
//! Protocol: the client sends one raw text message per turn; the server
//! replies with a sequence of `{"type":"stream","content":token}` frames
//! followed by one `{"type":"end","content":""}` frame. Within a connection,
//! turns are strictly sequential.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use regex::Regex;
use std::time::Duration;
use tokio::time::sleep;

use crate::chat::ConversationMemory;

use super::state::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle one chat connection. The connection's task owns its conversation
/// memory exclusively; nothing about the session survives the socket.
async fn handle_socket(mut socket: WebSocket, state: AppState) {
    tracing::info!("Chat client connected");

    let mut memory = ConversationMemory::with_limit(state.config().memory.max_turns);
    let pacing = Duration::from_millis(state.config().stream.pacing_delay_ms);

    while let Some(msg) = socket.recv().await {
        match msg {
            Ok(Message::Text(query)) => {
                let answer = state.engine().answer(&mut memory, &query).await;

                if stream_answer(&mut socket, &answer, pacing).await.is_err() {
                    tracing::info!("Chat client dropped mid-stream");
                    break;
                }
            }
            Ok(Message::Ping(data)) => {
                let _ = socket.send(Message::Pong(data)).await;
            }
            Ok(Message::Close(_)) => {
                tracing::info!("Chat client disconnected");
                break;
            }
            Err(e) => {
                tracing::warn!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    tracing::info!("Chat session closed ({} turns)", memory.len());
}

/// Push the answer as ordered stream frames followed by an end frame.
///
/// Each frame is sent only after the previous send completed; a failed send
/// abandons the rest of the stream. The pacing delay is a typing-effect
/// affordance and may be zero.
async fn stream_answer(
    socket: &mut WebSocket,
    answer: &str,
    pacing: Duration,
) -> std::result::Result<(), axum::Error> {
    for token in tokenize(answer) {
        let frame = serde_json::json!({ "type": "stream", "content": token });
        socket.send(Message::Text(frame.to_string())).await?;
        if !pacing.is_zero() {
            sleep(pacing).await;
        }
    }

    let end = serde_json::json!({ "type": "end", "content": "" });
    socket.send(Message::Text(end.to_string())).await
}

/// Split an answer into whitespace-delimited tokens, keeping newline runs as
/// their own tokens. Word tokens carry a trailing space so the client can
/// concatenate frame contents directly.
fn tokenize(text: &str) -> Vec<String> {
    let pattern = Regex::new(r"\S+|\n+").expect("Invalid regex");

    pattern
        .find_iter(text)
        .map(|m| {
            let token = m.as_str();
            if token.starts_with('\n') {
                token.to_string()
            } else {
                format!("{} ", token)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_carry_trailing_space() {
        assert_eq!(tokenize("the sky is blue"), vec!["the ", "sky ", "is ", "blue "]);
    }

    #[test]
    fn test_newline_runs_are_their_own_tokens() {
        assert_eq!(tokenize("one\n\ntwo"), vec!["one ", "\n\n", "two "]);
    }

    #[test]
    fn test_order_is_preserved() {
        let tokens = tokenize("a b c d");
        let rebuilt: String = tokens.concat();
        assert_eq!(rebuilt.trim_end(), "a b c d");
    }

    #[test]
    fn test_empty_answer_yields_no_tokens() {
        assert!(tokenize("").is_empty());
    }
}
