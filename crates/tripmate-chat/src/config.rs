// tripmate/tripmate-chat
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use url::Url;

use tripmate_stomp::config::{DEFAULT_HEARTBEAT_INTERVAL, DEFAULT_RECONNECT_DELAY};
use tripmate_stomp::StompConfig;

use crate::domain::rooms::models::DestinationTemplates;

pub const DEFAULT_ENDPOINT_URL: &str = "ws://localhost:8080/ws/chat";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_READ_ACK_DEBOUNCE: Duration = Duration::from_millis(400);

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid URL in {name}: {value}")]
    InvalidUrl { name: String, value: String },
    #[error("Invalid number of milliseconds in {name}: {value}")]
    InvalidMillis { name: String, value: String },
}

/// Process-wide configuration of the chat core.
///
/// Templates, intervals and endpoints are fixed for the lifetime of a
/// `RoomSession`; nothing here is renegotiated at runtime.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// The STOMP WebSocket endpoint.
    pub endpoint_url: Url,
    /// Base of the REST endpoints used for fallback sends and read receipts.
    pub api_base_url: Url,
    pub destinations: DestinationTemplates,
    #[serde(deserialize_with = "deserialize_millis")]
    pub read_ack_debounce: Duration,
    #[serde(deserialize_with = "deserialize_millis")]
    pub heartbeat_interval: Duration,
    #[serde(deserialize_with = "deserialize_millis")]
    pub reconnect_delay: Duration,
    pub access_token: Option<SecretString>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        ChatConfig {
            endpoint_url: Url::parse(DEFAULT_ENDPOINT_URL).expect("Invalid default endpoint URL"),
            api_base_url: Url::parse(DEFAULT_API_BASE_URL).expect("Invalid default API URL"),
            destinations: DestinationTemplates::default(),
            read_ack_debounce: DEFAULT_READ_ACK_DEBOUNCE,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            access_token: None,
        }
    }
}

impl ChatConfig {
    pub fn with_endpoint_url(mut self, url: Url) -> Self {
        self.endpoint_url = url;
        self
    }

    pub fn with_api_base_url(mut self, url: Url) -> Self {
        self.api_base_url = url;
        self
    }

    pub fn with_destinations(mut self, destinations: DestinationTemplates) -> Self {
        self.destinations = destinations;
        self
    }

    pub fn with_read_ack_debounce(mut self, debounce: Duration) -> Self {
        self.read_ack_debounce = debounce;
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(SecretString::new(token.into()));
        self
    }

    /// Loads the configuration from `TRIPMATE_*` environment variables,
    /// falling back to the defaults for unset ones.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = ChatConfig::default();

        if let Some(value) = vars.get("TRIPMATE_CHAT_ENDPOINT") {
            config.endpoint_url = parse_url("TRIPMATE_CHAT_ENDPOINT", value)?;
        }
        if let Some(value) = vars.get("TRIPMATE_API_BASE_URL") {
            config.api_base_url = parse_url("TRIPMATE_API_BASE_URL", value)?;
        }
        if let Some(value) = vars.get("TRIPMATE_SUBSCRIBE_TEMPLATE") {
            config.destinations.subscribe = value.clone();
        }
        if let Some(value) = vars.get("TRIPMATE_PUBLISH_TEMPLATE") {
            config.destinations.publish = value.clone();
        }
        if let Some(value) = vars.get("TRIPMATE_READ_ACK_DEBOUNCE_MS") {
            config.read_ack_debounce = parse_millis("TRIPMATE_READ_ACK_DEBOUNCE_MS", value)?;
        }
        if let Some(value) = vars.get("TRIPMATE_HEARTBEAT_MS") {
            config.heartbeat_interval = parse_millis("TRIPMATE_HEARTBEAT_MS", value)?;
        }
        if let Some(value) = vars.get("TRIPMATE_RECONNECT_DELAY_MS") {
            config.reconnect_delay = parse_millis("TRIPMATE_RECONNECT_DELAY_MS", value)?;
        }
        if let Some(value) = vars.get("TRIPMATE_ACCESS_TOKEN") {
            config.access_token = Some(SecretString::new(value.clone()));
        }

        Ok(config)
    }

    pub fn stomp_config(&self) -> StompConfig {
        let mut config = StompConfig::new(self.endpoint_url.clone());
        config.heartbeat_interval = self.heartbeat_interval;
        config.reconnect_delay = self.reconnect_delay;
        config.access_token = self.access_token.clone();
        config
    }
}

fn parse_url(name: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|_| ConfigError::InvalidUrl {
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn parse_millis(name: &str, value: &str) -> Result<Duration, ConfigError> {
    u64::from_str(value.trim())
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::InvalidMillis {
            name: name.to_string(),
            value: value.to_string(),
        })
}

fn deserialize_millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}
