// tripmate/tripmate-stomp
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{Sink, SinkExt, Stream, StreamExt};
use parking_lot::Mutex;
use secrecy::ExposeSecret;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, timeout, Instant, Interval};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, error, info, warn};

use crate::config::StompConfig;
use crate::connector::{
    Connection as ConnectionTrait, ConnectionError, ConnectionEvent, ConnectionEventHandler,
    Connector as ConnectorTrait, ReceivedMessage, SubscriptionId,
};
use crate::frame::{header, Command, Frame, HeartBeat};

/// STOMP over WebSocket. Reconnects with a fixed delay until deactivated.
pub struct Connector {
    config: StompConfig,
}

impl Connector {
    pub fn new(config: StompConfig) -> Self {
        Connector { config }
    }
}

impl ConnectorTrait for Connector {
    fn connect(
        &self,
        event_handler: ConnectionEventHandler,
    ) -> Result<Box<dyn ConnectionTrait>, ConnectionError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|err| {
            ConnectionError::Generic {
                msg: err.to_string(),
            }
        })?;

        let inner = Arc::new(ConnectionInner::default());
        let driver = runtime.spawn(run(self.config.clone(), inner.clone(), event_handler));
        inner.driver.lock().replace(driver);

        Ok(Box::new(Connection { inner }))
    }
}

pub struct Connection {
    inner: Arc<ConnectionInner>,
}

#[derive(Default)]
struct ConnectionInner {
    /// Present while a STOMP session is established.
    sender: Mutex<Option<UnboundedSender<Frame>>>,
    next_subscription_id: AtomicU64,
    is_deactivated: AtomicBool,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionInner {
    fn send_frame(&self, frame: Frame) -> Result<(), ConnectionError> {
        let sender = self.sender.lock();
        let Some(sender) = sender.as_ref() else {
            return Err(ConnectionError::NotConnected);
        };
        sender
            .send(frame)
            .map_err(|_| ConnectionError::NotConnected)
    }

    fn is_deactivated(&self) -> bool {
        self.is_deactivated.load(Ordering::SeqCst)
    }
}

impl ConnectionTrait for Connection {
    fn is_connected(&self) -> bool {
        self.inner.sender.lock().is_some()
    }

    fn subscribe(&self, destination: &str) -> Result<SubscriptionId, ConnectionError> {
        let id = SubscriptionId::from(format!(
            "sub-{}",
            self.inner.next_subscription_id.fetch_add(1, Ordering::SeqCst)
        ));
        self.inner
            .send_frame(Frame::subscribe(id.as_ref(), destination))?;
        Ok(id)
    }

    fn unsubscribe(&self, subscription: &SubscriptionId) -> Result<(), ConnectionError> {
        self.inner
            .send_frame(Frame::unsubscribe(subscription.as_ref()))
    }

    fn publish(&self, destination: &str, body: String) -> Result<(), ConnectionError> {
        self.inner.send_frame(Frame::send(destination, body))
    }

    fn deactivate(&self) {
        if self.inner.is_deactivated.swap(true, Ordering::SeqCst) {
            return;
        }

        // Dropping the sender lets the writer flush DISCONNECT and close the socket.
        if let Some(sender) = self.inner.sender.lock().take() {
            _ = sender.send(Frame::disconnect());
        }
        if let Some(driver) = self.inner.driver.lock().take() {
            driver.abort();
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.deactivate()
    }
}

async fn run(config: StompConfig, inner: Arc<ConnectionInner>, handler: ConnectionEventHandler) {
    loop {
        if inner.is_deactivated() {
            break;
        }

        info!("Connecting to {}…", config.url);
        let result = run_session(&config, &inner, &handler).await;
        let was_connected = inner.sender.lock().take().is_some();

        let error = match result {
            Ok(()) => None,
            Err(err) => {
                warn!("STOMP connection failed. {}", err);
                Some(err)
            }
        };

        if was_connected {
            (handler)(ConnectionEvent::Disconnected { error }).await;
        }

        if inner.is_deactivated() {
            break;
        }

        debug!("Reconnecting in {:?}…", config.reconnect_delay);
        sleep(config.reconnect_delay).await;
    }
}

async fn run_session(
    config: &StompConfig,
    inner: &ConnectionInner,
    handler: &ConnectionEventHandler,
) -> Result<(), ConnectionError> {
    let (socket, _) = connect_async(config.url.as_str())
        .await
        .map_err(generic_error)?;
    let (mut writer, mut reader) = socket.split();

    let heart_beat = HeartBeat::new(config.heartbeat_interval, config.heartbeat_interval);
    let authorization = config
        .access_token
        .as_ref()
        .map(|token| format!("Bearer {}", token.expose_secret()));

    writer
        .send(Message::Text(
            Frame::connect(&config.host(), heart_beat, authorization.as_deref()).encode(),
        ))
        .await
        .map_err(generic_error)?;

    let connected = timeout(config.connect_timeout, wait_for_connected(&mut reader))
        .await
        .map_err(|_| ConnectionError::TimedOut)??;

    let negotiated = heart_beat.negotiate(
        &connected
            .header(header::HEART_BEAT)
            .and_then(HeartBeat::parse)
            .unwrap_or_default(),
    );

    info!(
        "STOMP session established (version {}, heart-beat {:?}).",
        connected.header(header::VERSION).unwrap_or("unknown"),
        negotiated
    );

    let (sender, receiver) = mpsc::unbounded_channel();
    inner.sender.lock().replace(sender);
    (handler)(ConnectionEvent::Connected).await;

    let writer = tokio::spawn(write_loop(writer, receiver, negotiated.outgoing));
    let result = read_loop(&mut reader, negotiated.incoming, handler).await;
    writer.abort();

    result
}

async fn wait_for_connected<S>(reader: &mut S) -> Result<Frame, ConnectionError>
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    while let Some(message) = reader.next().await {
        let Some(frame) = decode_message(message.map_err(generic_error)?) else {
            continue;
        };

        match frame.command {
            Command::Connected => return Ok(frame),
            Command::Error => return Err(rejection(frame)),
            other => debug!("Ignoring {} frame before CONNECTED.", other),
        }
    }

    Err(ConnectionError::Generic {
        msg: "Socket closed before CONNECTED was received.".to_string(),
    })
}

async fn read_loop<S>(
    reader: &mut S,
    heart_beat: Duration,
    handler: &ConnectionEventHandler,
) -> Result<(), ConnectionError>
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    // Give the server twice its interval before declaring the connection dead.
    let read_timeout = (!heart_beat.is_zero()).then(|| heart_beat * 2);

    loop {
        let next = match read_timeout {
            Some(duration) => timeout(duration, reader.next())
                .await
                .map_err(|_| ConnectionError::TimedOut)?,
            None => reader.next().await,
        };

        let message = match next {
            None => return Ok(()),
            Some(Err(err)) => return Err(generic_error(err)),
            Some(Ok(Message::Close(_))) => return Ok(()),
            Some(Ok(message)) => message,
        };

        let Some(frame) = decode_message(message) else {
            continue;
        };

        match frame.command {
            Command::Message => {
                let Some(subscription) = frame.header(header::SUBSCRIPTION) else {
                    warn!("Dropping MESSAGE frame without subscription header.");
                    continue;
                };
                let subscription = SubscriptionId::from(subscription);
                let destination = frame
                    .header(header::DESTINATION)
                    .unwrap_or_default()
                    .to_string();

                (handler)(ConnectionEvent::Message(ReceivedMessage {
                    subscription,
                    destination,
                    body: frame.body,
                }))
                .await;
            }
            Command::Error => return Err(rejection(frame)),
            other => debug!("Ignoring {} frame.", other),
        }
    }
}

async fn write_loop<S>(mut writer: S, mut receiver: UnboundedReceiver<Frame>, heart_beat: Duration)
where
    S: Sink<Message, Error = WsError> + Unpin,
{
    let mut ticker = (!heart_beat.is_zero())
        .then(|| interval_at(Instant::now() + heart_beat, heart_beat));

    loop {
        let message = tokio::select! {
            frame = receiver.recv() => match frame {
                Some(frame) => Message::Text(frame.encode()),
                None => break,
            },
            _ = tick(&mut ticker) => Message::Text("\n".to_string()),
        };

        if let Err(err) = writer.send(message).await {
            error!("Failed to write to socket. {}", err);
            break;
        }
    }

    _ = writer.close().await;
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn decode_message(message: Message) -> Option<Frame> {
    let text = match message {
        Message::Text(text) => text,
        Message::Binary(bytes) => match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => {
                warn!("Dropping binary message that is not valid UTF-8.");
                return None;
            }
        },
        _ => return None,
    };

    match Frame::decode(&text) {
        Ok(frame) => frame,
        Err(err) => {
            warn!("Failed to decode STOMP frame. {}", err);
            None
        }
    }
}

fn rejection(frame: Frame) -> ConnectionError {
    let msg = match frame.header(header::MESSAGE) {
        Some(message) => message.to_string(),
        None => frame.body,
    };
    ConnectionError::Rejected { msg }
}

fn generic_error(err: WsError) -> ConnectionError {
    ConnectionError::Generic {
        msg: err.to_string(),
    }
}
