// tripmate/tripmate-chat
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use chat_room::{ChatRoomDetail, ChatRoomSummary};
pub use room_destinations::{DestinationTemplates, RoomDestinations};
pub use room_identity::{ChatDomain, RoomId, RoomIdentity, UserId};

mod chat_room;
mod room_destinations;
mod room_identity;
