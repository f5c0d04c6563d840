// tripmate/tripmate-chat
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::Arc;

use parking_lot::RwLock;

use crate::domain::messaging::models::ChatMessage;

type ReceiveCallback = Arc<dyn Fn(ChatMessage) + Send + Sync>;
type LifecycleCallback = Arc<dyn Fn() + Send + Sync>;

/// The consumer's callbacks for one render. May be rebuilt on every render.
#[derive(Clone, Default)]
pub struct RoomCallbacks {
    on_receive: Option<ReceiveCallback>,
    on_connected: Option<LifecycleCallback>,
    on_disconnected: Option<LifecycleCallback>,
}

impl RoomCallbacks {
    pub fn on_receive(mut self, callback: impl Fn(ChatMessage) + Send + Sync + 'static) -> Self {
        self.on_receive = Some(Arc::new(callback));
        self
    }

    pub fn on_connected(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_connected = Some(Arc::new(callback));
        self
    }

    pub fn on_disconnected(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_disconnected = Some(Arc::new(callback));
        self
    }
}

/// Single-slot cells holding the most recently rendered callbacks. Sessions
/// keep a reference to the slots, never to a callback, and read them at
/// dispatch time.
#[derive(Default)]
pub(crate) struct CallbackSlots {
    on_receive: RwLock<Option<ReceiveCallback>>,
    on_connected: RwLock<Option<LifecycleCallback>>,
    on_disconnected: RwLock<Option<LifecycleCallback>>,
}

impl CallbackSlots {
    pub fn replace(&self, callbacks: RoomCallbacks) {
        *self.on_receive.write() = callbacks.on_receive;
        *self.on_connected.write() = callbacks.on_connected;
        *self.on_disconnected.write() = callbacks.on_disconnected;
    }

    // The callback is cloned out of its slot before being called so that it
    // may re-render the owning session.
    pub fn dispatch_receive(&self, message: ChatMessage) {
        let callback = self.on_receive.read().clone();
        if let Some(callback) = callback {
            callback(message)
        }
    }

    pub fn dispatch_connected(&self) {
        let callback = self.on_connected.read().clone();
        if let Some(callback) = callback {
            callback()
        }
    }

    pub fn dispatch_disconnected(&self) {
        let callback = self.on_disconnected.read().clone();
        if let Some(callback) = callback {
            callback()
        }
    }
}
