use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// One-directional subscription edge, independent of friendship.
/// Existence of the record means "sender follows recipient".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Follow {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub sender: ObjectId,
    pub recipient: ObjectId,
    pub created_at: DateTime,
}

impl Follow {
    pub const COLLECTION: &'static str = "follows";
}
