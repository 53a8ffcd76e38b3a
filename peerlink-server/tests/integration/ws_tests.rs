use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use peerlink_core::{ClientMessage, ServerMessage};
use peerlink_server::{RoomRegistry, SignalingRouter, health, room_lookup, ws_handler};
use serde_json::json;
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::integration::init_tracing;

async fn start_server() -> (SocketAddr, SignalingRouter) {
    let router = SignalingRouter::new(RoomRegistry::new());
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/api/room/{id}", get(room_lookup))
        .route("/health", get(health))
        .with_state(router.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, router)
}

struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    async fn connect(addr: SocketAddr) -> Result<Self> {
        let (stream, _) = connect_async(format!("ws://{addr}/ws"))
            .await
            .context("websocket connect failed")?;
        Ok(Self { stream })
    }

    async fn send(&mut self, msg: &ClientMessage) -> Result<()> {
        let json = serde_json::to_string(msg)?;
        self.stream.send(Message::text(json)).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<ServerMessage> {
        let deadline = std::time::Duration::from_millis(2000);
        loop {
            let frame = tokio::time::timeout(deadline, self.stream.next())
                .await
                .context("timed out waiting for server message")?
                .context("socket closed")??;
            if let Message::Text(text) = frame {
                return Ok(serde_json::from_str(&text)?);
            }
        }
    }
}

#[tokio::test]
async fn join_and_relay_over_real_websockets() {
    init_tracing();
    let (addr, _router) = start_server().await;

    let mut alice = WsClient::connect(addr).await.unwrap();
    alice
        .send(&ClientMessage::JoinRoom {
            room: "WS-Room ".into(),
            user_id: "A".into(),
        })
        .await
        .unwrap();
    match alice.recv().await.unwrap() {
        ServerMessage::ParticipantsList { users } => assert!(users.is_empty()),
        other => panic!("expected ParticipantsList, got {other:?}"),
    }

    let mut bob = WsClient::connect(addr).await.unwrap();
    bob.send(&ClientMessage::JoinRoom {
        room: "ws-room".into(),
        user_id: "B".into(),
    })
    .await
    .unwrap();
    match bob.recv().await.unwrap() {
        ServerMessage::ParticipantsList { users } => assert_eq!(users, vec!["A"]),
        other => panic!("expected ParticipantsList, got {other:?}"),
    }
    assert!(matches!(
        alice.recv().await.unwrap(),
        ServerMessage::UserConnected { .. }
    ));

    bob.send(&ClientMessage::Offer {
        description: json!({"type": "offer", "sdp": "v=0"}),
    })
    .await
    .unwrap();
    match alice.recv().await.unwrap() {
        ServerMessage::Offer { from, .. } => assert_eq!(from, "B"),
        other => panic!("expected Offer, got {other:?}"),
    }
}

#[tokio::test]
async fn dropping_the_socket_notifies_the_remaining_member() {
    init_tracing();
    let (addr, router) = start_server().await;

    let mut alice = WsClient::connect(addr).await.unwrap();
    alice
        .send(&ClientMessage::JoinRoom {
            room: "drop-room".into(),
            user_id: "A".into(),
        })
        .await
        .unwrap();
    let _ = alice.recv().await.unwrap();

    let mut bob = WsClient::connect(addr).await.unwrap();
    bob.send(&ClientMessage::JoinRoom {
        room: "drop-room".into(),
        user_id: "B".into(),
    })
    .await
    .unwrap();
    let _ = bob.recv().await.unwrap();
    let _ = alice.recv().await.unwrap(); // UserConnected(B)

    drop(bob);

    match alice.recv().await.unwrap() {
        ServerMessage::UserDisconnected { user_id } => assert_eq!(user_id, "B"),
        other => panic!("expected UserDisconnected, got {other:?}"),
    }

    // only alice remains
    let room = peerlink_core::RoomId::normalize("drop-room").unwrap();
    assert_eq!(router.registry().participant_count(&room), 1);
}

#[tokio::test]
async fn malformed_frames_are_ignored() {
    init_tracing();
    let (addr, router) = start_server().await;

    let mut conn = WsClient::connect(addr).await.unwrap();
    conn.stream
        .send(Message::text("{not json"))
        .await
        .unwrap();
    conn.send(&ClientMessage::JoinRoom {
        room: "still-works".into(),
        user_id: "A".into(),
    })
    .await
    .unwrap();
    assert!(matches!(
        conn.recv().await.unwrap(),
        ServerMessage::ParticipantsList { .. }
    ));
    assert_eq!(router.registry().room_count(), 1);
}
