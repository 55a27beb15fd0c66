use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub recipient: ObjectId,
    pub sender: ObjectId,
    pub kind: NotificationKind,
    pub content: String,
    /// Frontend path the notification clicks through to.
    pub link: String,
    #[serde(default)]
    pub seen: bool,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    React,
    Comment,
    Follow,
    FriendRequest,
    FriendAccept,
    Message,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::React => "react",
            NotificationKind::Comment => "comment",
            NotificationKind::Follow => "follow",
            NotificationKind::FriendRequest => "friend_request",
            NotificationKind::FriendAccept => "friend_accept",
            NotificationKind::Message => "message",
        }
    }
}

impl Notification {
    pub const COLLECTION: &'static str = "notifications";
}
