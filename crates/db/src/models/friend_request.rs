use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// The single source of truth for friendship. There is no separate friends
/// collection; `status == Accepted` is what "friends" means. At most one
/// request exists per pair, enforced by the unique (sender, recipient)
/// index plus the revive-or-delete handling of cancelled requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRequest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub sender: ObjectId,
    pub recipient: ObjectId,
    #[serde(default)]
    pub status: FriendRequestStatus,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FriendRequestStatus {
    #[default]
    Pending,
    Accepted,
    Cancelled,
}

impl FriendRequest {
    pub const COLLECTION: &'static str = "friend_requests";

    /// The other party, from either participant's point of view.
    pub fn counterpart(&self, user_id: ObjectId) -> ObjectId {
        if self.sender == user_id {
            self.recipient
        } else {
            self.sender
        }
    }
}
