// tripmate/tripmate-chat
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use serde::Deserialize;

use super::RoomIdentity;

pub const DEFAULT_SUBSCRIBE_TEMPLATE: &str = "/sub/chat/{domain}/{roomId}";
pub const DEFAULT_PUBLISH_TEMPLATE: &str = "/pub/message/send/{domain}/{roomId}";

const DOMAIN_PLACEHOLDER: &str = "{domain}";
const ROOM_ID_PLACEHOLDER: &str = "{roomId}";

/// Topic templates containing `{domain}` and `{roomId}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DestinationTemplates {
    pub subscribe: String,
    pub publish: String,
}

impl Default for DestinationTemplates {
    fn default() -> Self {
        DestinationTemplates {
            subscribe: DEFAULT_SUBSCRIBE_TEMPLATE.to_string(),
            publish: DEFAULT_PUBLISH_TEMPLATE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomDestinations {
    pub subscribe: String,
    pub publish: String,
}

impl RoomDestinations {
    /// Topic names are case-sensitive on the broker, so the domain is always
    /// substituted lower-cased. Unknown placeholders are left untouched.
    pub fn resolve(templates: &DestinationTemplates, room: &RoomIdentity) -> Self {
        RoomDestinations {
            subscribe: substitute(&templates.subscribe, room),
            publish: substitute(&templates.publish, room),
        }
    }
}

fn substitute(template: &str, room: &RoomIdentity) -> String {
    template
        .replace(DOMAIN_PLACEHOLDER, &room.domain.path_segment())
        .replace(ROOM_ID_PLACEHOLDER, room.room_id.as_ref())
}
