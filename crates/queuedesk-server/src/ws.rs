//! WebSocket push channel for counter administration.
//!
//! Each text frame is one [`CounterCommand`]; the reply goes back to the
//! sending client only. A failing command never closes the socket.
//!
//! [`CounterCommand`]: queuedesk_shared::protocol::CounterCommand

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::HeaderMap,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::api::{verify_admin_token, AppState};
use crate::counters::CounterRegistry;
use crate::error::ServerError;

#[derive(Deserialize)]
pub struct WsParams {
    /// Browsers cannot set headers on a WebSocket handshake, so the admin
    /// token may also travel as `?token=`.
    token: Option<String>,
}

pub async fn counters_ws(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v));
    verify_admin_token(bearer.or(params.token.as_deref()), &state.config)?;

    let registry = state.counters.clone();
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, registry)))
}

async fn handle_socket(mut socket: WebSocket, registry: CounterRegistry) {
    info!("Counter client connected");

    while let Some(frame) = socket.recv().await {
        match frame {
            Ok(Message::Text(text)) => {
                let reply = registry.dispatch_text(&text).await;
                if socket.send(Message::Text(reply.to_json())).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            // Pongs are sent by the socket layer; binary frames are not part of the protocol.
            Ok(_) => {}
            Err(e) => {
                debug!(error = %e, "Counter socket error");
                break;
            }
        }
    }

    info!("Counter client disconnected");
}
