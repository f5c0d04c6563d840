// tripmate/tripmate-chat
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use chat_message::{ChatMessage, ChatParticipant, MessageId, UnreadUser};
pub use requests::{MarkAsReadRequest, OutgoingMessage};

mod chat_message;
mod requests;
pub(crate) mod sent_at_format;
