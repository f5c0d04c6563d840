// tripmate/tripmate-chat
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumString};

use tripmate_utils::id_string;

id_string!(RoomId);
id_string!(UserId);

/// The partition a chat room belongs to. Trip rooms accompany an itinerary,
/// mate rooms accompany a travel-companion post.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ChatDomain {
    Trip,
    Mate,
}

impl ChatDomain {
    /// Lower-cased name as used in topic and URL paths.
    pub fn path_segment(&self) -> String {
        self.to_string().to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomIdentity {
    pub domain: ChatDomain,
    pub room_id: RoomId,
}

impl RoomIdentity {
    pub fn new(domain: ChatDomain, room_id: impl Into<RoomId>) -> Self {
        RoomIdentity {
            domain,
            room_id: room_id.into(),
        }
    }
}

impl Display for RoomIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.domain.path_segment(), self.room_id)
    }
}
