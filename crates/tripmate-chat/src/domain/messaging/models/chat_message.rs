// tripmate/tripmate-chat
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::rooms::models::UserId;

use super::sent_at_format;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl From<i64> for MessageId {
    fn from(value: i64) -> Self {
        MessageId(value)
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatParticipant {
    pub user_id: UserId,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub profile_img: Option<String>,
}

/// A participant who has not read a message yet.
pub type UnreadUser = ChatParticipant;

/// A message as authored by the server. Never mutated after receipt, read
/// state changes arrive as fresh server data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(rename = "messageId")]
    pub id: MessageId,
    pub sender_id: UserId,
    #[serde(default)]
    pub sender_nickname: String,
    #[serde(default)]
    pub sender_profile_img: Option<String>,
    pub content: String,
    #[serde(with = "sent_at_format")]
    pub sent_at: DateTime<Utc>,
    /// Participants who have not read this message yet.
    #[serde(default, rename = "unreadUsers")]
    pub unread_by: Vec<UnreadUser>,
}

impl ChatMessage {
    pub fn is_sent_by(&self, user_id: &UserId) -> bool {
        &self.sender_id == user_id
    }

    pub fn is_unread_by(&self, user_id: &UserId) -> bool {
        self.unread_by
            .iter()
            .any(|participant| &participant.user_id == user_id)
    }

    pub fn unread_count(&self) -> usize {
        self.unread_by.len()
    }
}
