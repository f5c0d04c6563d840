// tripmate/tripmate-chat-integration-tests
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use tripmate_chat::RoomCallbacks;

/// Collects everything a set of `RoomCallbacks` was invoked with.
#[derive(Clone, Default)]
pub struct CallbackRecorder {
    received: Arc<Mutex<Vec<String>>>,
    connected: Arc<AtomicUsize>,
    disconnected: Arc<AtomicUsize>,
}

impl CallbackRecorder {
    pub fn callbacks(&self) -> RoomCallbacks {
        let received = self.received.clone();
        let connected = self.connected.clone();
        let disconnected = self.disconnected.clone();

        RoomCallbacks::default()
            .on_receive(move |message| received.lock().push(message.content))
            .on_connected(move || {
                connected.fetch_add(1, Ordering::SeqCst);
            })
            .on_disconnected(move || {
                disconnected.fetch_add(1, Ordering::SeqCst);
            })
    }

    /// Contents of all received messages in delivery order.
    pub fn received(&self) -> Vec<String> {
        self.received.lock().clone()
    }

    pub fn connected_count(&self) -> usize {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn disconnected_count(&self) -> usize {
        self.disconnected.load(Ordering::SeqCst)
    }
}
