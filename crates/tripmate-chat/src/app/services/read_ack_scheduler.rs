// tripmate/tripmate-chat
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::app::deps::DynChatApi;
use crate::domain::rooms::models::RoomIdentity;

/// Debounces "mark as read" for a single room.
///
/// Every call to `schedule` restarts the quiet period, so a burst of events
/// results in a single trailing request. A burst that never pauses for
/// `debounce_window` never fires.
pub struct ReadAckScheduler {
    room: RoomIdentity,
    chat_api: DynChatApi,
    debounce_window: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl ReadAckScheduler {
    pub fn new(room: RoomIdentity, chat_api: DynChatApi, debounce_window: Duration) -> Self {
        ReadAckScheduler {
            room,
            chat_api,
            debounce_window,
            pending: Default::default(),
        }
    }

    pub fn schedule(&self) {
        let Ok(runtime) = Handle::try_current() else {
            warn!("Cannot schedule read receipt for {} outside of a runtime.", self.room);
            return;
        };

        let room = self.room.clone();
        let chat_api = self.chat_api.clone();
        let debounce_window = self.debounce_window;

        let task = runtime.spawn(async move {
            tokio::time::sleep(debounce_window).await;

            debug!("Marking messages in {} as read…", room);
            if let Err(err) = chat_api.mark_as_read(&room, &[]).await {
                warn!("Failed to mark messages in {} as read. {}", room, err);
            }
        });

        if let Some(previous) = self.pending.lock().replace(task) {
            previous.abort();
        }
    }

    pub fn cancel(&self) {
        if let Some(task) = self.pending.lock().take() {
            task.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for ReadAckScheduler {
    fn drop(&mut self) {
        self.cancel()
    }
}
