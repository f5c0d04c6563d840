// tripmate/tripmate-chat-integration-tests
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;

use tripmate_chat::test::MessageBuilder;
use tripmate_chat::{ChatDomain, RoomIdentity, RoomSessionProps, SendError};

use super::helpers::{CallbackRecorder, TestRoomSession};

#[tokio::test]
async fn test_at_most_one_live_subscription() {
    let mut room = TestRoomSession::new();
    let recorder = CallbackRecorder::default();

    room.join(ChatDomain::Trip, "trip-1", &recorder).await;
    assert_eq!(room.connector.live_subscription_count(), 1);

    room.render_disabled(ChatDomain::Trip, "trip-1");
    assert_eq!(room.connector.live_subscription_count(), 0);

    room.join(ChatDomain::Trip, "trip-1", &recorder).await;
    assert_eq!(room.connector.live_subscription_count(), 1);

    room.join(ChatDomain::Trip, "trip-2", &recorder).await;
    assert_eq!(room.connector.live_subscription_count(), 1);

    room.join(ChatDomain::Mate, "trip-2", &recorder).await;
    assert_eq!(room.connector.live_subscription_count(), 1);

    // Re-rendering the same room neither reconnects nor subscribes twice.
    room.render(ChatDomain::Mate, "trip-2", &recorder);
    room.render(ChatDomain::Mate, "trip-2", &recorder);
    assert_eq!(room.connector.live_subscription_count(), 1);

    assert_eq!(room.session.session_count(), 4);
    assert_eq!(room.connector.connect_count(), 4);
    assert_eq!(
        room.connection().subscriptions()[0].1,
        "/sub/chat/mate/trip-2".to_string()
    );

    room.session.disconnect();
    assert_eq!(room.connector.live_subscription_count(), 0);
}

#[tokio::test]
async fn test_no_cross_room_leakage() {
    let mut room = TestRoomSession::new();
    let recorder = CallbackRecorder::default();

    room.join(ChatDomain::Trip, "trip-a", &recorder).await;
    let connection_a = room.connection();
    room.receive("from a").await;

    room.join(ChatDomain::Trip, "trip-b", &recorder).await;

    // Frame of room A that was already in flight when we switched rooms.
    connection_a
        .receive(
            MessageBuilder::new_with_index(2)
                .set_content("late from a")
                .build_frame_body(),
        )
        .await;
    room.receive("from b").await;

    assert_eq!(
        recorder.received(),
        vec!["from a".to_string(), "from b".to_string()]
    );
    assert!(!connection_a.is_active());
    assert_eq!(
        room.session.identity(),
        Some(RoomIdentity::new(ChatDomain::Trip, "trip-b"))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_no_cross_room_leakage_while_frames_arrive_concurrently() {
    let mut room = TestRoomSession::new();
    let body = MessageBuilder::new_with_index(1)
        .set_content("from a")
        .build_frame_body();
    let mut leaked = Vec::new();

    for idx in 0..200 {
        let recorder_a = CallbackRecorder::default();
        room.join(ChatDomain::Trip, &format!("a-{idx}"), &recorder_a).await;
        let connection_a = room.connection();

        let stop = Arc::new(AtomicBool::new(false));
        let frames = tokio::spawn({
            let stop = stop.clone();
            let body = body.clone();
            async move {
                while !stop.load(Ordering::SeqCst) {
                    connection_a.receive(body.clone()).await;
                    tokio::task::yield_now().await;
                }
            }
        });
        tokio::task::yield_now().await;

        let recorder_b = CallbackRecorder::default();
        room.render(ChatDomain::Trip, &format!("b-{idx}"), &recorder_b);

        stop.store(true, Ordering::SeqCst);
        frames.await.unwrap();

        leaked.extend(recorder_b.received());
    }

    assert_eq!(leaked, Vec::<String>::new());
}

#[tokio::test]
async fn test_latest_callback_is_invoked() {
    let mut room = TestRoomSession::new();
    let recorders = (0..10)
        .map(|_| CallbackRecorder::default())
        .collect::<Vec<_>>();

    for recorder in &recorders {
        room.render(ChatDomain::Trip, "trip-42", recorder);
    }
    room.connection().simulate_connect().await;
    room.receive("hi").await;

    assert_eq!(room.session.session_count(), 1);
    assert_eq!(room.connector.connect_count(), 1);

    for recorder in &recorders[..9] {
        assert!(recorder.received().is_empty());
        assert_eq!(recorder.connected_count(), 0);
    }
    assert_eq!(recorders[9].received(), vec!["hi".to_string()]);
    assert_eq!(recorders[9].connected_count(), 1);
}

#[tokio::test]
async fn test_enabled_without_room_id() {
    let mut room = TestRoomSession::new();

    room.session.render(RoomSessionProps {
        domain: ChatDomain::Trip,
        room_id: None,
        enabled: true,
        callbacks: CallbackRecorder::default().callbacks(),
    });

    assert_eq!(room.session.session_count(), 0);
    assert_eq!(room.connector.connect_count(), 0);
    assert!(!room.session.is_connected());
    assert!(matches!(
        room.session.send_message("hello").await,
        Err(SendError::NoActiveRoom)
    ));
    assert!(room.chat_api.sent_messages().is_empty());
}

#[tokio::test]
async fn test_disabled_room_does_not_connect() {
    let mut room = TestRoomSession::new();

    room.render_disabled(ChatDomain::Trip, "trip-42");

    assert_eq!(room.connector.connect_count(), 0);
    assert_eq!(room.session.identity(), None);
}

#[tokio::test]
async fn test_drop_tears_down_connection() {
    let mut room = TestRoomSession::new();
    let recorder = CallbackRecorder::default();

    room.join(ChatDomain::Trip, "trip-42", &recorder).await;
    let connection = room.connection();
    let connector = room.connector.clone();

    drop(room);

    assert!(!connection.is_active());
    assert_eq!(connector.live_subscription_count(), 0);
}
