// tripmate/tripmate-chat-integration-tests
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use callback_recorder::CallbackRecorder;
pub use test_room_session::{ChatApiLog, TestRoomSession};

mod callback_recorder;
mod test_room_session;
