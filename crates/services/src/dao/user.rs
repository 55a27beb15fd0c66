use backbook_db::models::{User, UserDetails};
use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct UserDao {
    pub base: BaseDao<User>,
}

impl UserDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, User::COLLECTION),
        }
    }

    /// Derives a lowercase alphanumeric handle from the name and appends a
    /// random suffix until it is free.
    pub async fn generate_username(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> DaoResult<String> {
        let base: String = format!("{first_name}{last_name}")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        let base = if base.is_empty() { "user".to_string() } else { base };

        let mut username = base.clone();
        loop {
            let taken = self
                .base
                .find_one(doc! { "username": &username })
                .await?
                .is_some();
            if !taken {
                return Ok(username);
            }
            username = format!("{}{}", base, nanoid::nanoid!(6));
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        first_name: String,
        last_name: String,
        username: String,
        email: String,
        password_hash: String,
        gender: String,
        birth: (i32, u32, u32),
        verification_code_hash: Option<String>,
    ) -> DaoResult<User> {
        let now = DateTime::now();
        let user = User {
            id: None,
            first_name,
            last_name,
            username,
            email,
            password_hash: Some(password_hash),
            picture: "/images/default_pic.png".to_string(),
            cover: None,
            gender,
            birth_year: birth.0,
            birth_month: birth.1,
            birth_day: birth.2,
            verified: false,
            details: UserDetails::default(),
            friends_count: 0,
            followers_count: 0,
            following_count: 0,
            unseen_messages: 0,
            unseen_notifications: 0,
            search_history: Vec::new(),
            saved_posts: Vec::new(),
            push_subscription: None,
            verification_code_hash,
            reset_code_hash: None,
            reset_code_expires_at: None,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&user).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> DaoResult<User> {
        self.base
            .find_one(doc! { "email": email })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn find_by_username(&self, username: &str) -> DaoResult<User> {
        self.base
            .find_one(doc! { "username": username })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn find_many_by_ids(&self, ids: &[ObjectId]) -> DaoResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.base
            .find_many(doc! { "_id": { "$in": ids.to_vec() } }, None)
            .await
    }

    pub async fn search(&self, term: &str) -> DaoResult<Vec<User>> {
        self.base
            .find_many(
                doc! {
                    "$or": [
                        { "first_name": { "$regex": term, "$options": "i" } },
                        { "last_name": { "$regex": term, "$options": "i" } },
                        { "username": { "$regex": term, "$options": "i" } },
                    ]
                },
                None,
            )
            .await
    }

    pub async fn update_details(
        &self,
        user_id: ObjectId,
        details: &UserDetails,
    ) -> DaoResult<bool> {
        self.base
            .update_by_id(
                user_id,
                doc! { "$set": { "details": bson::to_bson(details).map_err(bson::ser::Error::from)? } },
            )
            .await
    }

    /// Re-adding an already-searched user refreshes its timestamp instead
    /// of duplicating the entry.
    pub async fn add_search_history(
        &self,
        user_id: ObjectId,
        target: ObjectId,
    ) -> DaoResult<bool> {
        self.base
            .update_by_id(
                user_id,
                doc! { "$pull": { "search_history": { "user": target } } },
            )
            .await?;
        self.base
            .update_by_id(
                user_id,
                doc! {
                    "$push": {
                        "search_history": { "user": target, "created_at": DateTime::now() }
                    }
                },
            )
            .await
    }

    pub async fn remove_search_history(
        &self,
        user_id: ObjectId,
        target: ObjectId,
    ) -> DaoResult<bool> {
        self.base
            .update_by_id(
                user_id,
                doc! { "$pull": { "search_history": { "user": target } } },
            )
            .await
    }

    pub async fn set_picture(&self, user_id: ObjectId, url: &str) -> DaoResult<bool> {
        self.base
            .update_by_id(user_id, doc! { "$set": { "picture": url } })
            .await
    }

    pub async fn set_cover(&self, user_id: ObjectId, url: &str) -> DaoResult<bool> {
        self.base
            .update_by_id(user_id, doc! { "$set": { "cover": url } })
            .await
    }

    pub async fn set_push_subscription(
        &self,
        user_id: ObjectId,
        subscription: &str,
    ) -> DaoResult<bool> {
        self.base
            .update_by_id(user_id, doc! { "$set": { "push_subscription": subscription } })
            .await
    }

    pub async fn set_verification_code(
        &self,
        user_id: ObjectId,
        code_hash: &str,
    ) -> DaoResult<bool> {
        self.base
            .update_by_id(user_id, doc! { "$set": { "verification_code_hash": code_hash } })
            .await
    }

    pub async fn mark_verified(&self, user_id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_by_id(
                user_id,
                doc! {
                    "$set": { "verified": true },
                    "$unset": { "verification_code_hash": "" },
                },
            )
            .await
    }

    pub async fn set_reset_code(
        &self,
        user_id: ObjectId,
        code_hash: &str,
        expires_at: DateTime,
    ) -> DaoResult<bool> {
        self.base
            .update_by_id(
                user_id,
                doc! {
                    "$set": {
                        "reset_code_hash": code_hash,
                        "reset_code_expires_at": expires_at,
                    }
                },
            )
            .await
    }

    pub async fn update_password(
        &self,
        user_id: ObjectId,
        password_hash: &str,
    ) -> DaoResult<bool> {
        self.base
            .update_by_id(
                user_id,
                doc! {
                    "$set": { "password_hash": password_hash },
                    "$unset": { "reset_code_hash": "", "reset_code_expires_at": "" },
                },
            )
            .await
    }

    // Counter writes. Values come from the counter engine's aggregations;
    // always absolute, never incremental.

    pub async fn update_friends_count(
        &self,
        user_id: ObjectId,
        count: u64,
    ) -> DaoResult<bool> {
        self.base
            .update_by_id(user_id, doc! { "$set": { "friends_count": count as i64 } })
            .await
    }

    pub async fn update_follow_counts(
        &self,
        user_id: ObjectId,
        following: u64,
        followers: u64,
    ) -> DaoResult<bool> {
        self.base
            .update_by_id(
                user_id,
                doc! {
                    "$set": {
                        "following_count": following as i64,
                        "followers_count": followers as i64,
                    }
                },
            )
            .await
    }

    pub async fn update_unseen_messages(
        &self,
        user_id: ObjectId,
        count: u64,
    ) -> DaoResult<bool> {
        self.base
            .update_by_id(user_id, doc! { "$set": { "unseen_messages": count as i64 } })
            .await
    }

    pub async fn update_unseen_notifications(
        &self,
        user_id: ObjectId,
        count: u64,
    ) -> DaoResult<bool> {
        self.base
            .update_by_id(
                user_id,
                doc! { "$set": { "unseen_notifications": count as i64 } },
            )
            .await
    }

    pub async fn exists(&self, user_id: ObjectId) -> DaoResult<bool> {
        Ok(self.base.count(doc! { "_id": user_id }).await? > 0)
    }

    /// Returns whether the post is saved after the toggle.
    pub async fn toggle_saved_post(
        &self,
        user_id: ObjectId,
        post_id: ObjectId,
    ) -> DaoResult<bool> {
        let user = self.base.find_by_id(user_id).await?;
        let saved = user.saved_posts.iter().any(|s| s.post_id == post_id);

        let update = if saved {
            doc! { "$pull": { "saved_posts": { "post_id": post_id } } }
        } else {
            doc! {
                "$push": {
                    "saved_posts": { "post_id": post_id, "saved_at": DateTime::now() }
                }
            }
        };
        self.base.update_by_id(user_id, update).await?;
        Ok(!saved)
    }

    pub async fn find_push_subscription(
        &self,
        user_id: ObjectId,
    ) -> DaoResult<Option<String>> {
        let user = self.base.find_one(doc! { "_id": user_id }).await?;
        Ok(user.and_then(|u| u.push_subscription))
    }

    /// `search_history` entries joined to their user documents, newest
    /// searches first.
    pub async fn search_history_users(&self, user_id: ObjectId) -> DaoResult<Vec<User>> {
        let user = self.base.find_by_id(user_id).await?;
        let mut entries = user.search_history;
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let ids: Vec<ObjectId> = entries.iter().map(|e| e.user).collect();
        let users = self.find_many_by_ids(&ids).await?;

        // Preserve recency order from the history entries.
        let mut ordered = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(u) = users.iter().find(|u| u.id == Some(id)) {
                ordered.push(u.clone());
            }
        }
        Ok(ordered)
    }
}
