// tripmate/tripmate-chat
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use callbacks::RoomCallbacks;
pub use connection_session::{ConnectionSession, ConnectionState, SendError};
pub use read_ack_scheduler::ReadAckScheduler;
pub use room_session::{RoomSession, RoomSessionProps};

mod callbacks;
mod connection_session;
mod read_ack_scheduler;
mod room_session;
