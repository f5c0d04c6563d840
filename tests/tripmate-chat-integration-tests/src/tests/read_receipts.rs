// tripmate/tripmate-chat-integration-tests
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::time::sleep;

use tripmate_chat::{ChatDomain, RoomIdentity};

use super::helpers::{CallbackRecorder, TestRoomSession};

#[tokio::test(start_paused = true)]
async fn test_marks_room_as_read_after_quiet_period() {
    let mut room = TestRoomSession::new();
    let recorder = CallbackRecorder::default();

    room.join(ChatDomain::Trip, "trip-42", &recorder).await;
    sleep(Duration::from_millis(500)).await;

    // Joining the room marks it as read.
    assert_eq!(
        room.chat_api.read_receipts(),
        vec![RoomIdentity::new(ChatDomain::Trip, "trip-42")]
    );

    room.receive("hi").await;
    assert_eq!(recorder.received(), vec!["hi".to_string()]);

    sleep(Duration::from_millis(399)).await;
    assert_eq!(room.chat_api.read_receipt_count(), 1);

    sleep(Duration::from_millis(2)).await;
    assert_eq!(room.chat_api.read_receipt_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_burst_is_coalesced() {
    let mut room = TestRoomSession::new();
    let recorder = CallbackRecorder::default();

    room.join(ChatDomain::Trip, "trip-42", &recorder).await;

    for idx in 0..5 {
        room.receive(&format!("message {}", idx)).await;
        sleep(Duration::from_millis(100)).await;
    }

    // The connect and all five messages fell into the same window.
    assert_eq!(room.chat_api.read_receipt_count(), 0);

    sleep(Duration::from_millis(301)).await;
    assert_eq!(room.chat_api.read_receipt_count(), 1);
    assert_eq!(recorder.received().len(), 5);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(room.chat_api.read_receipt_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_leaving_room_cancels_pending_receipt() {
    let mut room = TestRoomSession::new();
    let recorder = CallbackRecorder::default();

    room.join(ChatDomain::Trip, "trip-42", &recorder).await;
    room.receive("hi").await;
    sleep(Duration::from_millis(200)).await;

    room.render_disabled(ChatDomain::Trip, "trip-42");
    sleep(Duration::from_secs(1)).await;

    assert_eq!(room.chat_api.read_receipt_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_read_receipt_targets_new_room() {
    let mut room = TestRoomSession::new();
    let recorder = CallbackRecorder::default();

    room.join(ChatDomain::Trip, "trip-a", &recorder).await;
    room.join(ChatDomain::Mate, "mate-b", &recorder).await;
    sleep(Duration::from_secs(1)).await;

    assert_eq!(
        room.chat_api.read_receipts(),
        vec![RoomIdentity::new(ChatDomain::Mate, "mate-b")]
    );
}
