// tripmate/tripmate-chat
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use chat_api::ChatApi;

mod chat_api;

#[cfg(any(test, feature = "test"))]
pub mod mocks {
    pub use super::chat_api::MockChatApi;
}
