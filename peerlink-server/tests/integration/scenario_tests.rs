use peerlink_core::{RoomId, ServerMessage};
use serde_json::json;

use crate::integration::{create_router, init_tracing};
use crate::utils::{TestConnection, expect_participants};

/// The end-to-end relay walk: `"Room42 "` normalizes to `room42`, A then
/// B join, B initiates, descriptions and candidates are exchanged, A
/// leaves and B is told.
#[tokio::test]
async fn two_party_call_walkthrough() {
    init_tracing();
    let router = create_router();

    let mut alice = TestConnection::connect(&router);
    alice.join(&router, "Room42 ", "A");
    assert!(expect_participants(&mut alice).await.unwrap().is_empty());

    let mut bob = TestConnection::connect(&router);
    bob.join(&router, "room42", "B");
    assert_eq!(expect_participants(&mut bob).await.unwrap(), vec!["A"]);
    match alice.recv().await.unwrap() {
        ServerMessage::UserConnected { user_id } => assert_eq!(user_id, "B"),
        other => panic!("expected UserConnected, got {other:?}"),
    }

    // B saw a non-empty snapshot, so B is the initiator
    router.on_offer(&bob.session, json!({"type": "offer", "sdp": "v=0 b"}));
    match alice.recv().await.unwrap() {
        ServerMessage::Offer { from, .. } => assert_eq!(from, "B"),
        other => panic!("expected Offer, got {other:?}"),
    }

    router.on_answer(&alice.session, json!({"type": "answer", "sdp": "v=0 a"}));
    match bob.recv().await.unwrap() {
        ServerMessage::Answer { from, .. } => assert_eq!(from, "A"),
        other => panic!("expected Answer, got {other:?}"),
    }

    // candidates flow both ways, point-to-point
    router.on_candidate(&alice.session, json!({"candidate": "a-1"}));
    router.on_candidate(&bob.session, json!({"candidate": "b-1"}));
    assert!(matches!(
        bob.recv().await.unwrap(),
        ServerMessage::IceCandidate { .. }
    ));
    assert!(matches!(
        alice.recv().await.unwrap(),
        ServerMessage::IceCandidate { .. }
    ));

    router.on_leave(&mut alice.session);
    match bob.recv().await.unwrap() {
        ServerMessage::UserDisconnected { user_id } => assert_eq!(user_id, "A"),
        other => panic!("expected UserDisconnected, got {other:?}"),
    }

    let room = RoomId::normalize("room42").unwrap();
    assert_eq!(router.registry().participant_count(&room), 1);
    bob.disconnect(&router);
    assert!(!router.registry().contains(&room));
}
