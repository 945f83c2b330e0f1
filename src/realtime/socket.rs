// realtime/socket.rs - GET /ws live update channel
//
// The token travels in `?token=` (browser sockets cannot set headers) or in
// the usual Authorization header. Frames are JSON `{"event", "data"}`.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use super::hub::{EventName, Frame, Session};
use crate::auth::bearer_token;
use crate::database::store::UserStore;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SocketQuery {
    pub token: Option<String>,
}

pub async fn ws_handler(
    State(state): State<AppState>,
    Query(query): Query<SocketQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let token = match query.token.as_deref().filter(|t| !t.is_empty()) {
        Some(token) => token.to_string(),
        None => bearer_token(&headers)?.to_string(),
    };
    let claims = state.keys.verify(&token)?;

    let user = state
        .store
        .find_user(claims.id)
        .await?
        .ok_or_else(|| ApiError::forbidden("User account no longer exists"))?;
    if user.role != claims.role {
        return Err(ApiError::forbidden("User access level mismatch, please log in again"));
    }

    let hub = state.hub.clone();
    Ok(ws.on_upgrade(move |socket| async move {
        let session = hub.connect(user.id, user.role);
        info!("Socket connected for user {} ({})", user.id, user.role);
        run_session(socket, session).await;
        info!("Socket disconnected for user {}", user.id);
    }))
}

async fn run_session(socket: WebSocket, mut session: Session) {
    let (mut sender, mut receiver) = socket.split();

    let hello = Frame {
        event: EventName::ConnectionStatus,
        data: json!({
            "connected": true,
            "userId": session.user_id(),
            "role": session.role(),
        }),
    };
    if send_frame(&mut sender, &hello).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            frame = session.next_frame() => {
                let Some(frame) = frame else {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                };
                if send_frame(&mut sender, &frame).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(payload))) => {
                        if sender.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => debug!("Ignoring client frame from {}", session.user_id()),
                    Some(Err(e)) => {
                        warn!("Socket error for user {}: {}", session.user_id(), e);
                        break;
                    }
                }
            }
        }
    }
}

async fn send_frame<S>(sender: &mut S, frame: &Frame) -> Result<(), ()>
where
    S: SinkExt<Message> + Unpin,
{
    let text = match serde_json::to_string(frame) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to serialize socket frame: {}", e);
            return Ok(());
        }
    };
    sender.send(Message::Text(text)).await.map_err(|_| ())
}
