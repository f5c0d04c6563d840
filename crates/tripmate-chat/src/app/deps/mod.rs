// tripmate/tripmate-chat
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::Arc;

use anyhow::Result;

use tripmate_stomp::connector::websocket;
use tripmate_stomp::Connector;

use crate::config::ChatConfig;
use crate::domain::messaging::services::ChatApi;
use crate::infra::messaging::RestChatApi;

pub type DynChatApi = Arc<dyn ChatApi>;
pub type DynChatConfig = Arc<ChatConfig>;
pub type DynConnector = Arc<dyn Connector>;

/// Everything a `RoomSession` needs from the outside world.
#[derive(Clone)]
pub struct RoomSessionDependencies {
    pub config: DynChatConfig,
    pub connector: DynConnector,
    pub chat_api: DynChatApi,
}

impl RoomSessionDependencies {
    /// STOMP over WebSocket for the push channel, the REST API for
    /// everything else.
    pub fn from_config(config: ChatConfig) -> Result<Self> {
        let connector = websocket::Connector::new(config.stomp_config());
        let chat_api = RestChatApi::from_config(&config)?;

        Ok(RoomSessionDependencies {
            config: Arc::new(config),
            connector: Arc::new(connector),
            chat_api: Arc::new(chat_api),
        })
    }
}
