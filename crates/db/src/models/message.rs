use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub chat_id: ObjectId,
    pub sender_id: ObjectId,
    #[serde(default)]
    pub kind: MessageKind,
    /// Text body, or the image URL for `Image` messages; absent for `Like`.
    pub content: Option<String>,
    #[serde(default)]
    pub seen: SeenState,
    #[serde(default)]
    pub seen_by: Vec<ObjectId>,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    Like,
    Info,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
            MessageKind::Like => "like",
            MessageKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeenState {
    #[default]
    Unseen,
    Seen,
}

impl Message {
    pub const COLLECTION: &'static str = "messages";
}
