use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub kind: ChatKind,
    /// Group name; private chats have none.
    pub name: Option<String>,
    pub members: Vec<ObjectId>,
    /// Group admin; rename and membership changes require it.
    pub admin_id: Option<ObjectId>,
    #[serde(default = "default_theme")]
    pub theme: u32,
    pub latest_message_id: Option<ObjectId>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    #[default]
    Private,
    Group,
}

impl ChatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatKind::Private => "private",
            ChatKind::Group => "group",
        }
    }
}

pub const THEME_MIN: u32 = 1;
pub const THEME_MAX: u32 = 39;

fn default_theme() -> u32 {
    19
}

impl Chat {
    pub const COLLECTION: &'static str = "chats";
}
