use backbook_db::models::Follow;
use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;

use super::base::{BaseDao, DaoResult};

pub struct FollowDao {
    pub base: BaseDao<Follow>,
}

impl FollowDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Follow::COLLECTION),
        }
    }

    pub async fn create(&self, sender: ObjectId, recipient: ObjectId) -> DaoResult<Follow> {
        let follow = Follow {
            id: None,
            sender,
            recipient,
            created_at: DateTime::now(),
        };

        let id = self.base.insert_one(&follow).await?;
        self.base.find_by_id(id).await
    }

    pub async fn exists(&self, sender: ObjectId, recipient: ObjectId) -> DaoResult<bool> {
        Ok(self
            .base
            .count(doc! { "sender": sender, "recipient": recipient })
            .await?
            > 0)
    }

    pub async fn delete(&self, sender: ObjectId, recipient: ObjectId) -> DaoResult<bool> {
        Ok(self
            .base
            .hard_delete(doc! { "sender": sender, "recipient": recipient })
            .await?
            > 0)
    }

    /// Removes both directions of a pair's edges, for friendship removal.
    pub async fn delete_both(&self, a: ObjectId, b: ObjectId) -> DaoResult<u64> {
        self.base
            .hard_delete(doc! {
                "$or": [
                    { "sender": a, "recipient": b },
                    { "sender": b, "recipient": a },
                ]
            })
            .await
    }

    pub async fn following_ids(&self, user_id: ObjectId) -> DaoResult<Vec<ObjectId>> {
        let edges = self
            .base
            .find_many(doc! { "sender": user_id }, None)
            .await?;
        Ok(edges.into_iter().map(|e| e.recipient).collect())
    }
}
