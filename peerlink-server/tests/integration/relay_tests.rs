use peerlink_core::ServerMessage;
use serde_json::json;

use crate::integration::{create_router, init_tracing};
use crate::utils::{TestConnection, expect_participants};

#[tokio::test]
async fn offer_reaches_every_other_member_and_nobody_else() {
    init_tracing();
    let router = create_router();

    let mut alice = TestConnection::connect(&router);
    let mut bob = TestConnection::connect(&router);
    let mut carol = TestConnection::connect(&router);
    alice.join(&router, "x", "A");
    bob.join(&router, "x", "B");
    carol.join(&router, "y", "C");
    let _ = expect_participants(&mut alice).await.unwrap();
    let _ = expect_participants(&mut bob).await.unwrap();
    let _ = expect_participants(&mut carol).await.unwrap();
    let _ = alice.recv().await.unwrap(); // UserConnected(B)

    let sdp = json!({"type": "offer", "sdp": "v=0..."});
    router.on_offer(&alice.session, sdp.clone());

    match bob.recv().await.unwrap() {
        ServerMessage::Offer { description, from } => {
            assert_eq!(description, sdp);
            assert_eq!(from, "A");
        }
        other => panic!("expected Offer, got {other:?}"),
    }
    assert!(alice.try_recv().is_none(), "sender gets no echo");
    assert!(carol.try_recv().is_none(), "other rooms see nothing");
}

#[tokio::test]
async fn signals_from_a_roomless_connection_go_nowhere() {
    init_tracing();
    let router = create_router();

    let mut alice = TestConnection::connect(&router);
    alice.join(&router, "x", "A");
    let _ = expect_participants(&mut alice).await.unwrap();

    let stray = TestConnection::connect(&router);
    router.on_offer(&stray.session, json!({"sdp": "v=0"}));
    router.on_candidate(&stray.session, json!({"candidate": "c"}));

    assert!(alice.try_recv().is_none());
}

#[tokio::test]
async fn per_sender_delivery_order_is_preserved() {
    init_tracing();
    let router = create_router();

    let mut alice = TestConnection::connect(&router);
    let mut bob = TestConnection::connect(&router);
    alice.join(&router, "x", "A");
    bob.join(&router, "x", "B");
    let _ = expect_participants(&mut alice).await.unwrap();
    let _ = expect_participants(&mut bob).await.unwrap();
    let _ = alice.recv().await.unwrap();

    router.on_offer(&alice.session, json!({"seq": 0}));
    for seq in 1..=3 {
        router.on_candidate(&alice.session, json!({"seq": seq}));
    }

    match bob.recv().await.unwrap() {
        ServerMessage::Offer { description, .. } => assert_eq!(description["seq"], 0),
        other => panic!("expected Offer, got {other:?}"),
    }
    for seq in 1..=3 {
        match bob.recv().await.unwrap() {
            ServerMessage::IceCandidate { candidate, .. } => {
                assert_eq!(candidate["seq"], seq);
            }
            other => panic!("expected IceCandidate, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn answer_is_tagged_with_the_responders_identity() {
    init_tracing();
    let router = create_router();

    let mut alice = TestConnection::connect(&router);
    let mut bob = TestConnection::connect(&router);
    alice.join(&router, "x", "A");
    bob.join(&router, "x", "B");
    let _ = expect_participants(&mut alice).await.unwrap();
    let _ = expect_participants(&mut bob).await.unwrap();
    let _ = alice.recv().await.unwrap();

    router.on_answer(&bob.session, json!({"type": "answer"}));
    match alice.recv().await.unwrap() {
        ServerMessage::Answer { from, .. } => assert_eq!(from, "B"),
        other => panic!("expected Answer, got {other:?}"),
    }
}
