use backbook_db::models::{Notification, NotificationKind};
use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;

use super::base::{BaseDao, DaoResult};

pub struct NotificationDao {
    pub base: BaseDao<Notification>,
}

impl NotificationDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Notification::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        recipient: ObjectId,
        sender: ObjectId,
        kind: NotificationKind,
        content: String,
        link: String,
    ) -> DaoResult<Notification> {
        let notification = Notification {
            id: None,
            recipient,
            sender,
            kind,
            content,
            link,
            seen: false,
            created_at: DateTime::now(),
        };

        let id = self.base.insert_one(&notification).await?;
        self.base.find_by_id(id).await
    }

    pub async fn list_for_user(&self, recipient: ObjectId) -> DaoResult<Vec<Notification>> {
        self.base
            .find_many(
                doc! { "recipient": recipient },
                Some(doc! { "created_at": -1 }),
            )
            .await
    }

    pub async fn mark_all_seen(&self, recipient: ObjectId) -> DaoResult<u64> {
        let result = self
            .base
            .collection()
            .update_many(
                doc! { "recipient": recipient, "seen": false },
                doc! { "$set": { "seen": true } },
            )
            .await?;
        Ok(result.modified_count)
    }
}
