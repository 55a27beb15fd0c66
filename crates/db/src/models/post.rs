use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    #[serde(default)]
    pub kind: PostKind,
    pub text: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    /// Styled-text background tag, only meaningful for `Normal` posts.
    pub background: Option<String>,
    /// Source post for `Share` posts.
    pub shared_post_id: Option<ObjectId>,
    #[serde(default)]
    pub reactions: ReactionStats,
    #[serde(default)]
    pub comments_count: u32,
    #[serde(default)]
    pub shares_count: u32,
    pub last_comment_id: Option<ObjectId>,
    // Soft delete; deleted posts stay for audit but are invisible to reads.
    #[serde(default)]
    pub deleted: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PostKind {
    #[default]
    Normal,
    ProfilePhoto,
    Cover,
    Share,
}

impl PostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::Normal => "normal",
            PostKind::ProfilePhoto => "profile_photo",
            PostKind::Cover => "cover",
            PostKind::Share => "share",
        }
    }
}

/// Denormalized reaction aggregate, recomputed from the reactions
/// collection after every toggle.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReactionStats {
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub types: ReactionBreakdown,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReactionBreakdown {
    #[serde(default)]
    pub like: u32,
    #[serde(default)]
    pub love: u32,
    #[serde(default)]
    pub haha: u32,
    #[serde(default)]
    pub wow: u32,
    #[serde(default)]
    pub sad: u32,
    #[serde(default)]
    pub angry: u32,
}

impl Post {
    pub const COLLECTION: &'static str = "posts";
}
