// tripmate/tripmate-chat-integration-tests
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use parking_lot::Mutex;

use tripmate_chat::test::{MessageBuilder, MockRoomSessionDependencies};
use tripmate_chat::{ChatDomain, RoomIdentity, RoomSession, RoomSessionProps};
use tripmate_stomp::test::{Connection, Connector};

use super::CallbackRecorder;

/// What the REST fallback was asked to do.
#[derive(Clone, Default)]
pub struct ChatApiLog {
    sent_messages: Arc<Mutex<Vec<(RoomIdentity, String)>>>,
    read_receipts: Arc<Mutex<Vec<RoomIdentity>>>,
    fail_sends: Arc<AtomicBool>,
}

impl ChatApiLog {
    pub fn sent_messages(&self) -> Vec<(RoomIdentity, String)> {
        self.sent_messages.lock().clone()
    }

    pub fn read_receipts(&self) -> Vec<RoomIdentity> {
        self.read_receipts.lock().clone()
    }

    pub fn read_receipt_count(&self) -> usize {
        self.read_receipts.lock().len()
    }

    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst)
    }
}

pub struct TestRoomSession {
    pub session: RoomSession,
    pub connector: Connector,
    pub chat_api: ChatApiLog,
}

impl TestRoomSession {
    pub fn new() -> Self {
        let mut deps = MockRoomSessionDependencies::default();
        let chat_api = ChatApiLog::default();

        {
            let log = chat_api.clone();
            deps.chat_api
                .expect_send_message()
                .returning(move |room, content| {
                    log.sent_messages
                        .lock()
                        .push((room.clone(), content.to_string()));
                    if log.fail_sends.load(Ordering::SeqCst) {
                        return Err(anyhow!("503 Service Unavailable"));
                    }
                    Ok(())
                });
        }
        {
            let log = chat_api.clone();
            deps.chat_api
                .expect_mark_as_read()
                .returning(move |room, _| {
                    log.read_receipts.lock().push(room.clone());
                    Ok(())
                });
        }

        let connector = deps.connector.clone();

        TestRoomSession {
            session: RoomSession::new(deps.into()),
            connector,
            chat_api,
        }
    }

    pub fn render(&mut self, domain: ChatDomain, room_id: &str, recorder: &CallbackRecorder) {
        self.session
            .render(RoomSessionProps::new(domain, room_id).callbacks(recorder.callbacks()))
    }

    pub fn render_disabled(&mut self, domain: ChatDomain, room_id: &str) {
        self.session
            .render(RoomSessionProps::new(domain, room_id).enabled(false))
    }

    pub fn connection(&self) -> Connection {
        self.connector
            .current_connection()
            .expect("No connection was opened")
    }

    /// Renders `room_id` and lets the server acknowledge the connection.
    pub async fn join(&mut self, domain: ChatDomain, room_id: &str, recorder: &CallbackRecorder) {
        self.render(domain, room_id, recorder);
        self.connection().simulate_connect().await;
    }

    pub async fn receive(&self, content: &str) {
        self.connection()
            .receive(
                MessageBuilder::new_with_index(1)
                    .set_content(content)
                    .build_frame_body(),
            )
            .await
    }
}
