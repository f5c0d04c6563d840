// tripmate/tripmate-stomp
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct StompConfig {
    /// The WebSocket endpoint, e.g. `wss://example.org/ws/chat`.
    pub url: Url,
    /// Value of the CONNECT `host` header. Defaults to the URL's host.
    pub host: Option<String>,
    /// Used for both directions of the heart-beat negotiation.
    pub heartbeat_interval: Duration,
    /// Fixed delay between two connection attempts.
    pub reconnect_delay: Duration,
    /// How long to wait for CONNECTED after the socket opened.
    pub connect_timeout: Duration,
    /// Sent as `Authorization: Bearer <token>` with CONNECT.
    pub access_token: Option<SecretString>,
}

impl StompConfig {
    pub fn new(url: Url) -> Self {
        StompConfig {
            url,
            host: None,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            access_token: None,
        }
    }

    pub(crate) fn host(&self) -> String {
        self.host
            .clone()
            .or_else(|| self.url.host_str().map(ToString::to_string))
            .unwrap_or_else(|| "/".to_string())
    }
}
