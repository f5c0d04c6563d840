// tripmate/tripmate-chat
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::messaging::models::MessageId;
use crate::domain::rooms::models::{ChatDomain, ChatRoomDetail, ChatRoomSummary, RoomIdentity};

/// Point-to-point chat endpoints. Used as the fallback path when the push
/// transport is unavailable and for everything that isn't real-time.
#[cfg_attr(any(test, feature = "test"), mockall::automock)]
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn send_message(&self, room: &RoomIdentity, content: &str) -> Result<()>;

    /// Passing no ids marks all messages in `room` as read.
    async fn mark_as_read(&self, room: &RoomIdentity, message_ids: &[MessageId]) -> Result<()>;

    async fn load_rooms(&self, domain: ChatDomain) -> Result<Vec<ChatRoomSummary>>;
    async fn load_room(&self, room: &RoomIdentity) -> Result<ChatRoomDetail>;
}
