use backbook_db::models::{Chat, ChatKind};
use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;

use super::base::{BaseDao, DaoResult};

pub struct ChatDao {
    pub base: BaseDao<Chat>,
}

impl ChatDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Chat::COLLECTION),
        }
    }

    /// Opens the private chat between two users, reusing the existing one.
    /// Returns the chat and whether it was created by this call.
    pub async fn find_or_create_private(
        &self,
        a: ObjectId,
        b: ObjectId,
    ) -> DaoResult<(Chat, bool)> {
        let existing = self
            .base
            .find_one(doc! {
                "kind": "private",
                "members": { "$all": [a, b], "$size": 2 },
            })
            .await?;

        if let Some(chat) = existing {
            return Ok((chat, false));
        }

        let now = DateTime::now();
        let chat = Chat {
            id: None,
            kind: ChatKind::Private,
            name: None,
            members: vec![a, b],
            admin_id: None,
            theme: 19,
            latest_message_id: None,
            created_at: now,
            updated_at: now,
        };
        let id = self.base.insert_one(&chat).await?;
        Ok((self.base.find_by_id(id).await?, true))
    }

    pub async fn create_group(
        &self,
        name: String,
        admin: ObjectId,
        mut members: Vec<ObjectId>,
    ) -> DaoResult<Chat> {
        if !members.contains(&admin) {
            members.push(admin);
        }

        let now = DateTime::now();
        let chat = Chat {
            id: None,
            kind: ChatKind::Group,
            name: Some(name),
            members,
            admin_id: Some(admin),
            theme: 19,
            latest_message_id: None,
            created_at: now,
            updated_at: now,
        };
        let id = self.base.insert_one(&chat).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_id(&self, id: ObjectId) -> DaoResult<Option<Chat>> {
        self.base.find_one(doc! { "_id": id }).await
    }

    pub async fn is_member(&self, chat_id: ObjectId, user_id: ObjectId) -> DaoResult<bool> {
        Ok(self
            .base
            .count(doc! { "_id": chat_id, "members": user_id })
            .await?
            > 0)
    }

    /// Most recently active first; `set_latest_message` bumps `updated_at`.
    pub async fn list_for_user(&self, user_id: ObjectId) -> DaoResult<Vec<Chat>> {
        self.base
            .find_many(
                doc! { "members": user_id },
                Some(doc! { "updated_at": -1 }),
            )
            .await
    }

    pub async fn rename(&self, chat_id: ObjectId, name: &str) -> DaoResult<bool> {
        self.base
            .update_by_id(chat_id, doc! { "$set": { "name": name } })
            .await
    }

    pub async fn add_member(&self, chat_id: ObjectId, user_id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_by_id(chat_id, doc! { "$addToSet": { "members": user_id } })
            .await
    }

    pub async fn remove_member(
        &self,
        chat_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<bool> {
        self.base
            .update_by_id(chat_id, doc! { "$pull": { "members": user_id } })
            .await
    }

    pub async fn set_theme(&self, chat_id: ObjectId, theme: u32) -> DaoResult<bool> {
        self.base
            .update_by_id(chat_id, doc! { "$set": { "theme": theme } })
            .await
    }

    pub async fn set_latest_message(
        &self,
        chat_id: ObjectId,
        message_id: ObjectId,
    ) -> DaoResult<bool> {
        self.base
            .update_by_id(chat_id, doc! { "$set": { "latest_message_id": message_id } })
            .await
    }
}
