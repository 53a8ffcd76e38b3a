use crate::signaling::{ConnectionSession, SignalingRouter};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use peerlink_core::{ClientMessage, PeerId};
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(router): State<SignalingRouter>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, router))
}

async fn handle_socket(socket: WebSocket, router: SignalingRouter) {
    let peer = PeerId::new();
    info!(%peer, "new signaling connection");

    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    router.register(peer, tx);
    let mut session = ConnectionSession::new(peer);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sink.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!(error = %e, "failed to serialize outbound signal"),
            }
        }
    });

    while let Some(Ok(msg)) = stream.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => router.dispatch(&mut session, client_msg),
                Err(e) => warn!(%peer, error = %e, "invalid signaling message"),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    // Cleanup steps are independent and each best-effort: membership
    // removal and member notification happen even if the socket died
    // mid-frame, and the outbox is dropped regardless.
    router.on_disconnect(&mut session);
    router.unregister(peer);
    send_task.abort();
    let _ = (&mut send_task).await;

    info!(%peer, "signaling connection closed");
}
