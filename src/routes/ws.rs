//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic::*;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "zhongkuai_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "zhongkuai_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // One request message, one reply message.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "zhongkuai_backend", ?incoming, "WS received");
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "zhongkuai_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "zhongkuai_backend", "WebSocket disconnected");
}

#[instrument(level = "info", skip(msg, state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::Ingest { material, count } => {
      let out = ingest_material(state, &material, count).await;
      match out.error {
        Some(message) => ServerWsMessage::Error { message },
        None => ServerWsMessage::Ingested { loaded: out.loaded },
      }
    }

    ClientWsMessage::DrillView => ServerWsMessage::Drill { drill: drill_view(state).await },

    ClientWsMessage::SubmitAnswer { choice } => {
      let v = submit_choice(state, &choice).await;
      tracing::info!(target: "quiz", correct = v.correct, "WS submit_answer graded");
      ServerWsMessage::Verdict {
        correct: v.correct,
        answer: v.answer,
        explanation: v.explanation,
        suggestion: v.suggestion,
        mistakes: v.mistakes,
      }
    }

    ClientWsMessage::Advance => ServerWsMessage::Drill { drill: advance_drill(state).await },

    ClientWsMessage::Restart => ServerWsMessage::Drill { drill: restart_drill(state).await },

    ClientWsMessage::MistakeBook => {
      let book = mistake_book(state).await;
      ServerWsMessage::MistakeBook { entries: book.entries, total: book.total }
    }

    ClientWsMessage::ForgetMistake { index } => {
      let book = forget_mistake(state, index).await;
      ServerWsMessage::MistakeBook { entries: book.entries, total: book.total }
    }
  }
}
