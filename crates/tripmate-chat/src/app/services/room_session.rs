// tripmate/tripmate-chat
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::app::deps::RoomSessionDependencies;
use crate::domain::rooms::models::{ChatDomain, RoomDestinations, RoomId, RoomIdentity};

use super::callbacks::{CallbackSlots, RoomCallbacks};
use super::connection_session::{ConnectionSession, ConnectionState, SendError};
use super::read_ack_scheduler::ReadAckScheduler;

/// Input of a single `RoomSession::render`.
#[derive(Clone)]
pub struct RoomSessionProps {
    pub domain: ChatDomain,
    pub room_id: Option<RoomId>,
    pub enabled: bool,
    pub callbacks: RoomCallbacks,
}

impl RoomSessionProps {
    pub fn new(domain: ChatDomain, room_id: impl Into<RoomId>) -> Self {
        RoomSessionProps {
            domain,
            room_id: Some(room_id.into()),
            enabled: true,
            callbacks: Default::default(),
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn callbacks(mut self, callbacks: RoomCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SessionKey {
    enabled: bool,
    domain: ChatDomain,
    room_id: Option<RoomId>,
}

impl SessionKey {
    fn identity(&self) -> Option<RoomIdentity> {
        if !self.enabled {
            return None;
        }
        let room_id = self.room_id.as_ref().filter(|id| !id.is_empty())?;
        Some(RoomIdentity::new(self.domain, room_id.clone()))
    }
}

/// Keeps at most one `ConnectionSession` alive for whatever room the
/// consumer is currently looking at.
///
/// `render` may be called as often as the consumer likes. The session is
/// only rebuilt when `enabled`, `domain` or `room_id` change, while the
/// callbacks of the latest render are always the ones that get invoked.
pub struct RoomSession {
    deps: RoomSessionDependencies,
    callbacks: Arc<CallbackSlots>,
    key: Option<SessionKey>,
    session: Option<ConnectionSession>,
    sessions_created: usize,
}

impl RoomSession {
    pub fn new(deps: RoomSessionDependencies) -> Self {
        RoomSession {
            deps,
            callbacks: Default::default(),
            key: None,
            session: None,
            sessions_created: 0,
        }
    }

    pub fn render(&mut self, props: RoomSessionProps) {
        let key = SessionKey {
            enabled: props.enabled,
            domain: props.domain,
            room_id: props.room_id,
        };

        if self.key.as_ref() == Some(&key) {
            self.callbacks.replace(props.callbacks);
            return;
        }

        // The old room must not see the new callbacks.
        self.teardown();
        self.callbacks.replace(props.callbacks);

        if let Some(identity) = key.identity() {
            self.session = Some(self.build_session(identity));
        } else {
            debug!("Chat is disabled or no room is selected.");
        }
        self.key = Some(key);
    }

    pub fn is_connected(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(ConnectionSession::is_connected)
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.session
            .as_ref()
            .map(ConnectionSession::state)
            .unwrap_or(ConnectionState::Disconnected)
    }

    pub fn identity(&self) -> Option<RoomIdentity> {
        self.session.as_ref().map(|s| s.identity().clone())
    }

    pub fn destinations(&self) -> Option<RoomDestinations> {
        self.session.as_ref().map(|s| s.destinations().clone())
    }

    /// Number of sessions built over the lifetime of this `RoomSession`.
    pub fn session_count(&self) -> usize {
        self.sessions_created
    }

    /// The returned future is detached from `self`, so it keeps sending to
    /// the room that was current when it was created.
    pub fn send_message(
        &self,
        content: impl Into<String>,
    ) -> impl Future<Output = Result<(), SendError>> + Send + 'static {
        let session = self.session.clone();
        let content = content.into();

        async move {
            let Some(session) = session else {
                return Err(SendError::NoActiveRoom);
            };
            session.send(&content).await
        }
    }

    /// Leaves the current room. The next `render` with different props
    /// connects again.
    pub fn disconnect(&mut self) {
        self.teardown()
    }

    fn build_session(&mut self, identity: RoomIdentity) -> ConnectionSession {
        let config = &self.deps.config;

        let session = ConnectionSession::new(
            identity.clone(),
            RoomDestinations::resolve(&config.destinations, &identity),
            self.deps.connector.clone(),
            self.deps.chat_api.clone(),
            self.callbacks.clone(),
            ReadAckScheduler::new(
                identity,
                self.deps.chat_api.clone(),
                config.read_ack_debounce,
            ),
        );
        self.sessions_created += 1;

        session.activate();
        session
    }

    fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            session.deactivate();
        }
    }
}

impl Drop for RoomSession {
    fn drop(&mut self) {
        self.teardown()
    }
}
