// tripmate/tripmate-chat
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::config::ChatConfig;
use crate::domain::messaging::models::{MarkAsReadRequest, MessageId, OutgoingMessage};
use crate::domain::messaging::services::ChatApi;
use crate::domain::rooms::models::{ChatDomain, ChatRoomDetail, ChatRoomSummary, RoomIdentity};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// `ChatApi` backed by the chat server's JSON endpoints.
pub struct RestChatApi {
    client: Client,
    base_url: Url,
    access_token: Option<SecretString>,
}

impl RestChatApi {
    pub fn new(base_url: Url, access_token: Option<SecretString>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(RestChatApi {
            client,
            base_url,
            access_token,
        })
    }

    pub fn from_config(config: &ChatConfig) -> Result<Self> {
        Self::new(config.api_base_url.clone(), config.access_token.clone())
    }

    fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("{} cannot be used as a base URL", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn rooms_url(&self, domain: ChatDomain) -> Result<Url> {
        let domain = domain.path_segment();
        self.url(["chat", domain.as_str(), "rooms"])
    }

    fn room_url(&self, room: &RoomIdentity, suffix: Option<&str>) -> Result<Url> {
        let domain = room.domain.path_segment();
        let mut segments = vec!["chat", domain.as_str(), "rooms", room.room_id.as_ref()];
        segments.extend(suffix);
        self.url(segments)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }
}

#[async_trait]
impl ChatApi for RestChatApi {
    async fn send_message(&self, room: &RoomIdentity, content: &str) -> Result<()> {
        let url = self.room_url(room, Some("messages"))?;
        debug!("POST {}", url);

        self.authorized(self.client.post(url))
            .json(&OutgoingMessage {
                chat_id: room.room_id.clone(),
                content: content.to_string(),
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn mark_as_read(&self, room: &RoomIdentity, message_ids: &[MessageId]) -> Result<()> {
        let url = self.room_url(room, Some("read"))?;
        debug!("PATCH {}", url);

        self.authorized(self.client.patch(url))
            .json(&MarkAsReadRequest {
                chat_id: room.room_id.clone(),
                message_ids: message_ids.to_vec(),
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn load_rooms(&self, domain: ChatDomain) -> Result<Vec<ChatRoomSummary>> {
        let url = self.rooms_url(domain)?;
        debug!("GET {}", url);

        Ok(self
            .authorized(self.client.get(url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    async fn load_room(&self, room: &RoomIdentity) -> Result<ChatRoomDetail> {
        let url = self.room_url(room, None)?;
        debug!("GET {}", url);

        Ok(self
            .authorized(self.client.get(url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }
}
