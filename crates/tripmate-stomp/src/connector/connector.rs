// tripmate/tripmate-stomp
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::future::Future;
use std::pin::Pin;

use tripmate_utils::id_string;

id_string!(
    /// Identifies one SUBSCRIBE on a connection. Unique per connection.
    SubscriptionId
);

pub type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

pub type ConnectionEventHandler =
    Box<dyn Fn(ConnectionEvent) -> PinnedFuture<()> + Send + Sync>;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ConnectionError {
    #[error("Not connected")]
    NotConnected,
    #[error("Timed out")]
    TimedOut,
    #[error("Rejected by server: {msg}")]
    Rejected { msg: String },
    #[error("{msg:?}")]
    Generic { msg: String },
}

/// Activates a persistent, auto-reconnecting connection.
///
/// `connect` returns as soon as the connection is activated. Establishing the
/// session happens in the background and is reported through the event
/// handler (`ConnectionEvent::Connected`), as are all subsequent losses and
/// re-establishments until the returned connection is deactivated.
pub trait Connector: Send + Sync {
    fn connect(
        &self,
        event_handler: ConnectionEventHandler,
    ) -> Result<Box<dyn Connection>, ConnectionError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    Connected,
    Disconnected { error: Option<ConnectionError> },
    Message(ReceivedMessage),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedMessage {
    pub subscription: SubscriptionId,
    pub destination: String,
    pub body: String,
}

pub trait Connection: Send + Sync {
    fn is_connected(&self) -> bool;
    fn subscribe(&self, destination: &str) -> Result<SubscriptionId, ConnectionError>;
    fn unsubscribe(&self, subscription: &SubscriptionId) -> Result<(), ConnectionError>;
    fn publish(&self, destination: &str, body: String) -> Result<(), ConnectionError>;
    /// Closes the connection and stops reconnecting. No events are delivered
    /// after this returns.
    fn deactivate(&self);
}
