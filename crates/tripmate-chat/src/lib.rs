// tripmate/tripmate-chat
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use app::deps::RoomSessionDependencies;
pub use app::services::{
    ConnectionState, RoomCallbacks, RoomSession, RoomSessionProps, SendError,
};
pub use config::{ChatConfig, ConfigError};
pub use domain::messaging::models::{ChatMessage, ChatParticipant, MessageId};
pub use domain::rooms::models::{ChatDomain, RoomDestinations, RoomId, RoomIdentity, UserId};
pub use infra::messaging::RestChatApi;


pub mod app;
pub mod config;
pub mod domain;
pub mod infra;
