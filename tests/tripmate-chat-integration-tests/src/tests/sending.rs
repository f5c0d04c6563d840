// tripmate/tripmate-chat-integration-tests
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use pretty_assertions::assert_eq;
use serde_json::json;

use tripmate_chat::{ChatDomain, RoomIdentity, SendError};
use tripmate_stomp::ConnectionError;

use super::helpers::{CallbackRecorder, TestRoomSession};

#[tokio::test]
async fn test_publishes_while_connected() {
    let mut room = TestRoomSession::new();
    let recorder = CallbackRecorder::default();

    room.join(ChatDomain::Trip, "trip-42", &recorder).await;
    room.session.send_message("hello").await.unwrap();

    let attempts = room.connection().publish_attempts();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].destination, "/pub/message/send/trip/trip-42");
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&attempts[0].body).unwrap(),
        json!({ "chatId": "trip-42", "content": "hello" })
    );
    assert!(room.chat_api.sent_messages().is_empty());
}

#[tokio::test]
async fn test_falls_back_once_when_publish_fails() {
    let mut room = TestRoomSession::new();
    let recorder = CallbackRecorder::default();

    room.join(ChatDomain::Trip, "trip-42", &recorder).await;
    room.connection().fail_publish_with(ConnectionError::Generic {
        msg: "broken pipe".to_string(),
    });

    room.session.send_message("hello").await.unwrap();

    assert_eq!(room.connection().publish_attempts().len(), 1);
    assert_eq!(
        room.chat_api.sent_messages(),
        vec![(
            RoomIdentity::new(ChatDomain::Trip, "trip-42"),
            "hello".to_string()
        )]
    );
}

#[tokio::test]
async fn test_fallback_failure_is_reported() {
    let mut room = TestRoomSession::new();
    let recorder = CallbackRecorder::default();

    room.join(ChatDomain::Trip, "trip-42", &recorder).await;
    room.connection().fail_publish_with(ConnectionError::NotConnected);
    room.chat_api.fail_sends();

    let result = room.session.send_message("hello").await;

    assert!(matches!(result, Err(SendError::Fallback(_))));
    assert_eq!(room.connection().publish_attempts().len(), 1);
    assert_eq!(room.chat_api.sent_messages().len(), 1);
}

#[tokio::test]
async fn test_sends_via_rest_before_connected() {
    let mut room = TestRoomSession::new();
    let recorder = CallbackRecorder::default();

    room.render(ChatDomain::Mate, "mate-7", &recorder);
    room.session.send_message("  on my way ").await.unwrap();

    assert!(room.connection().publish_attempts().is_empty());
    assert_eq!(
        room.chat_api.sent_messages(),
        vec![(
            RoomIdentity::new(ChatDomain::Mate, "mate-7"),
            "on my way".to_string()
        )]
    );
}

#[tokio::test]
async fn test_rejects_blank_messages() {
    let mut room = TestRoomSession::new();
    let recorder = CallbackRecorder::default();

    room.join(ChatDomain::Trip, "trip-42", &recorder).await;

    assert!(matches!(
        room.session.send_message("   ").await,
        Err(SendError::EmptyContent)
    ));
    assert!(room.connection().publish_attempts().is_empty());
    assert!(room.chat_api.sent_messages().is_empty());
}
