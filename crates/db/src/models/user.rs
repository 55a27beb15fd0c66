use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default = "default_picture")]
    pub picture: String,
    pub cover: Option<String>,
    pub gender: String,
    pub birth_year: i32,
    pub birth_month: u32,
    pub birth_day: u32,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub details: UserDetails,
    // Denormalized counters. Caches over friend_requests/follows/messages/
    // notifications, recomputed after every mutation, never incremented.
    #[serde(default)]
    pub friends_count: u32,
    #[serde(default)]
    pub followers_count: u32,
    #[serde(default)]
    pub following_count: u32,
    #[serde(default)]
    pub unseen_messages: u32,
    #[serde(default)]
    pub unseen_notifications: u32,
    #[serde(default)]
    pub search_history: Vec<SearchEntry>,
    #[serde(default)]
    pub saved_posts: Vec<SavedPost>,
    /// Raw Web Push subscription JSON as handed over by the browser.
    pub push_subscription: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_code_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_code_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_code_expires_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserDetails {
    pub bio: Option<String>,
    pub other_name: Option<String>,
    pub job: Option<String>,
    pub workplace: Option<String>,
    pub high_school: Option<String>,
    pub college: Option<String>,
    pub current_city: Option<String>,
    pub hometown: Option<String>,
    pub relationship: Option<String>,
    pub instagram: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEntry {
    pub user: ObjectId,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedPost {
    pub post_id: ObjectId,
    pub saved_at: DateTime,
}

fn default_picture() -> String {
    "/images/default_pic.png".to_string()
}

impl User {
    pub const COLLECTION: &'static str = "users";

    /// Strips secret material before the document leaves the API.
    pub fn sanitized(mut self) -> Self {
        self.password_hash = None;
        self.verification_code_hash = None;
        self.reset_code_hash = None;
        self.reset_code_expires_at = None;
        self
    }
}
