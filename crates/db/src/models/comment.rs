use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Comments and their replies live flat in one collection; a reply carries
/// the parent comment in `parent_id`, one level deep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub post_id: ObjectId,
    pub user_id: ObjectId,
    pub parent_id: Option<ObjectId>,
    pub text: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub likes: Vec<ObjectId>,
    pub created_at: DateTime,
}

impl Comment {
    pub const COLLECTION: &'static str = "comments";
}
