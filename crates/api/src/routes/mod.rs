pub mod auth;
pub mod chat;
pub mod comment;
pub mod friend;
pub mod message;
pub mod notification;
pub mod post;
pub mod user;

use backbook_db::models::User;
use bson::oid::ObjectId;
use serde::Serialize;

use crate::error::ApiError;

/// Compact user representation embedded in friend lists, posts, comments,
/// chats and notifications.
#[derive(Debug, Clone, Serialize)]
pub struct UserCard {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub picture: String,
}

impl UserCard {
    pub fn from_user(u: &User) -> Self {
        Self {
            id: u.id.map(|id| id.to_hex()).unwrap_or_default(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            username: u.username.clone(),
            picture: u.picture.clone(),
        }
    }
}

pub(crate) fn parse_object_id(value: &str, field: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(value).map_err(|_| ApiError::BadRequest(format!("Invalid {field}")))
}

/// The card for `user_id` out of a pre-fetched batch.
pub(crate) fn card_for(users: &[User], user_id: ObjectId) -> Option<UserCard> {
    users
        .iter()
        .find(|u| u.id == Some(user_id))
        .map(UserCard::from_user)
}
