// tripmate/tripmate-chat
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::messaging::models::{sent_at_format, ChatMessage, ChatParticipant};

use super::RoomId;

/// One entry of the room list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRoomSummary {
    #[serde(rename = "chatId")]
    pub room_id: RoomId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default, with = "sent_at_format::option")]
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub unread_count: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRoomDetail {
    #[serde(rename = "chatId")]
    pub room_id: RoomId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub participants: Vec<ChatParticipant>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}
