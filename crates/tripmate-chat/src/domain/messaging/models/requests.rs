// tripmate/tripmate-chat
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use serde::Serialize;

use crate::domain::rooms::models::RoomId;

use super::MessageId;

/// Body of both the STOMP publish and the REST fallback send.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    pub chat_id: RoomId,
    pub content: String,
}

/// An empty `message_ids` list marks everything in the room as read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAsReadRequest {
    pub chat_id: RoomId,
    pub message_ids: Vec<MessageId>,
}
