// tripmate/tripmate-chat
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex, RwLock};
use thiserror::Error;
use tracing::{debug, info, warn};

use tripmate_stomp::{
    Connection, ConnectionError, ConnectionEvent, PinnedFuture, ReceivedMessage, SubscriptionId,
};

use crate::app::deps::{DynChatApi, DynConnector};
use crate::domain::messaging::models::{ChatMessage, OutgoingMessage};
use crate::domain::rooms::models::{RoomDestinations, RoomIdentity};

use super::callbacks::CallbackSlots;
use super::read_ack_scheduler::ReadAckScheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error("There is no active chat room to send to.")]
    NoActiveRoom,
    #[error("Cannot send an empty message.")]
    EmptyContent,
    #[error(transparent)]
    Encoding(#[from] serde_json::Error),
    #[error("Failed to send message via REST fallback. {0}")]
    Fallback(#[source] anyhow::Error),
}

/// One STOMP subscription for one room, plus the read receipts it triggers.
///
/// A session is never reused for another room. Once deactivated it stays
/// inert, late transport events addressed to it are dropped.
#[derive(Clone)]
pub struct ConnectionSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    identity: RoomIdentity,
    destinations: RoomDestinations,
    connector: DynConnector,
    chat_api: DynChatApi,
    callbacks: Arc<CallbackSlots>,
    read_ack: ReadAckScheduler,
    is_active: AtomicBool,
    /// Held while a transport event is handled and while deactivating, so
    /// that no callback runs after `deactivate` returned. Reentrant because
    /// callbacks may tear the session down themselves.
    dispatch_lock: ReentrantMutex<()>,
    state: RwLock<ConnectionState>,
    connection: RwLock<Option<Box<dyn Connection>>>,
    subscription: Mutex<Option<SubscriptionId>>,
}

impl ConnectionSession {
    pub(crate) fn new(
        identity: RoomIdentity,
        destinations: RoomDestinations,
        connector: DynConnector,
        chat_api: DynChatApi,
        callbacks: Arc<CallbackSlots>,
        read_ack: ReadAckScheduler,
    ) -> Self {
        ConnectionSession {
            inner: Arc::new(SessionInner {
                identity,
                destinations,
                connector,
                chat_api,
                callbacks,
                read_ack,
                is_active: AtomicBool::new(true),
                dispatch_lock: ReentrantMutex::new(()),
                state: RwLock::new(ConnectionState::Disconnected),
                connection: Default::default(),
                subscription: Default::default(),
            }),
        }
    }

    pub fn identity(&self) -> &RoomIdentity {
        &self.inner.identity
    }

    pub fn destinations(&self) -> &RoomDestinations {
        &self.inner.destinations
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.read()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    /// Opens the transport. Does nothing if a connection was already opened
    /// or the session has been deactivated.
    pub fn activate(&self) {
        let inner = &self.inner;

        if !inner.is_active() || inner.connection.read().is_some() {
            return;
        }

        info!("Connecting to chat room {}…", inner.identity);
        *inner.state.write() = ConnectionState::Connecting;

        let session = Arc::downgrade(inner);
        let result = inner.connector.connect(Box::new(move |event| {
            let session = session.clone();
            Box::pin(async move {
                let Some(session) = Weak::upgrade(&session) else {
                    return;
                };
                session.handle_event(event)
            }) as PinnedFuture<_>
        }));

        let connection = match result {
            Ok(connection) => connection,
            Err(err) => {
                warn!("Failed to connect to chat room {}. {}", inner.identity, err);
                *inner.state.write() = ConnectionState::Disconnected;
                return;
            }
        };

        {
            let mut slot = inner.connection.write();
            if slot.is_some() || !inner.is_active() {
                drop(slot);
                connection.deactivate();
                return;
            }
            slot.replace(connection);
        }

        // CONNECTED may have raced us storing the connection.
        if *inner.state.read() == ConnectionState::Connected {
            let _guard = inner.dispatch_lock.lock();
            inner.ensure_subscribed();
        }
    }

    /// Tears the session down. Safe to call repeatedly.
    pub fn deactivate(&self) {
        let inner = &self.inner;
        let _guard = inner.dispatch_lock.lock();

        if !inner.is_active.swap(false, Ordering::SeqCst) {
            return;
        }

        info!("Leaving chat room {}.", inner.identity);
        inner.read_ack.cancel();

        let subscription = inner.subscription.lock().take();
        let connection = inner.connection.write().take();

        if let Some(connection) = connection {
            if let Some(subscription) = subscription {
                if let Err(err) = connection.unsubscribe(&subscription) {
                    debug!("Failed to unsubscribe from {}. {}", inner.identity, err);
                }
            }
            connection.deactivate();
        }

        *inner.state.write() = ConnectionState::Disconnected;
    }

    /// Sends `content` to the room. Publishes via STOMP while connected and
    /// falls back to the REST endpoint otherwise or when publishing fails.
    pub async fn send(&self, content: &str) -> Result<(), SendError> {
        let inner = &self.inner;

        let content = content.trim();
        if content.is_empty() {
            return Err(SendError::EmptyContent);
        }

        if inner.is_connected() {
            let body = serde_json::to_string(&OutgoingMessage {
                chat_id: inner.identity.room_id.clone(),
                content: content.to_string(),
            })?;

            let result = match inner.connection.read().as_ref() {
                Some(connection) => connection.publish(&inner.destinations.publish, body),
                None => Err(ConnectionError::NotConnected),
            };

            match result {
                Ok(()) => {
                    inner.read_ack.schedule();
                    return Ok(());
                }
                Err(err) => warn!(
                    "Failed to publish message to {}. Falling back to REST. {}",
                    inner.identity, err
                ),
            }
        } else {
            debug!("Not connected to {}. Sending message via REST.", inner.identity);
        }

        inner
            .chat_api
            .send_message(&inner.identity, content)
            .await
            .map_err(SendError::Fallback)?;

        inner.read_ack.schedule();
        Ok(())
    }
}

impl SessionInner {
    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }

    fn is_connected(&self) -> bool {
        if *self.state.read() != ConnectionState::Connected {
            return false;
        }
        self.connection
            .read()
            .as_ref()
            .is_some_and(|connection| connection.is_connected())
    }

    fn handle_event(&self, event: ConnectionEvent) {
        let _guard = self.dispatch_lock.lock();

        if !self.is_active() {
            debug!("Ignoring {:?} for inactive room {}.", event, self.identity);
            return;
        }

        match event {
            ConnectionEvent::Connected => self.handle_connected(),
            ConnectionEvent::Disconnected { error } => {
                match error {
                    Some(err) => warn!("Lost connection to {}. {}", self.identity, err),
                    None => info!("Disconnected from {}.", self.identity),
                }
                self.handle_disconnected()
            }
            ConnectionEvent::Message(message) => self.handle_message(message),
        }
    }

    fn handle_connected(&self) {
        *self.state.write() = ConnectionState::Connected;
        self.callbacks.dispatch_connected();

        // The callback may have torn us down.
        if !self.is_active() {
            return;
        }

        self.ensure_subscribed();
    }

    /// Subscribes to the room unless a subscription for the current
    /// transport session exists already.
    fn ensure_subscribed(&self) {
        if !self.is_active() {
            return;
        }

        let result = {
            let connection = self.connection.read();
            let Some(connection) = connection.as_ref() else {
                debug!("Deferring subscription to {} until connected.", self.identity);
                return;
            };

            let mut subscription = self.subscription.lock();
            if subscription.is_some() {
                return;
            }

            connection
                .subscribe(&self.destinations.subscribe)
                .map(|id| subscription.replace(id))
        };

        match result {
            Ok(_) => {
                debug!("Subscribed to {}.", self.destinations.subscribe);
                self.read_ack.schedule();
            }
            Err(err) => warn!("Failed to subscribe to {}. {}", self.destinations.subscribe, err),
        }
    }

    fn handle_disconnected(&self) {
        *self.state.write() = ConnectionState::Disconnected;
        self.subscription.lock().take();
        self.callbacks.dispatch_disconnected();
    }

    fn handle_message(&self, message: ReceivedMessage) {
        let is_current = self.subscription.lock().as_ref() == Some(&message.subscription);
        if !is_current {
            debug!(
                "Ignoring message for stale subscription {} in {}.",
                message.subscription, self.identity
            );
            return;
        }

        let chat_message = match serde_json::from_str::<ChatMessage>(&message.body) {
            Ok(chat_message) => chat_message,
            Err(err) => {
                debug!("Dropping malformed message in {}. {}", self.identity, err);
                return;
            }
        };

        self.callbacks.dispatch_receive(chat_message);

        if self.is_active() {
            self.read_ack.schedule();
        }
    }
}
