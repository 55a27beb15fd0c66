use backbook_db::models::{Message, MessageKind, SeenState};
use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;

use super::base::{BaseDao, DaoResult, PaginatedResult, PaginationParams};

pub struct MessageDao {
    pub base: BaseDao<Message>,
}

impl MessageDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Message::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        chat_id: ObjectId,
        sender_id: ObjectId,
        kind: MessageKind,
        content: Option<String>,
    ) -> DaoResult<Message> {
        let message = Message {
            id: None,
            chat_id,
            sender_id,
            kind,
            content,
            seen: SeenState::Unseen,
            seen_by: Vec::new(),
            created_at: DateTime::now(),
        };

        let id = self.base.insert_one(&message).await?;
        self.base.find_by_id(id).await
    }

    pub async fn list_for_chat(
        &self,
        chat_id: ObjectId,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<Message>> {
        self.base
            .find_paginated(
                doc! { "chat_id": chat_id },
                Some(doc! { "created_at": -1 }),
                params,
            )
            .await
    }

    pub async fn find_many_by_ids(&self, ids: &[ObjectId]) -> DaoResult<Vec<Message>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.base
            .find_many(doc! { "_id": { "$in": ids.to_vec() } }, None)
            .await
    }

    /// Marks everything the viewer has not sent in this chat as seen.
    pub async fn mark_seen(&self, chat_id: ObjectId, viewer: ObjectId) -> DaoResult<u64> {
        let result = self
            .base
            .collection()
            .update_many(
                doc! {
                    "chat_id": chat_id,
                    "sender_id": { "$ne": viewer },
                    "seen": "unseen",
                },
                doc! {
                    "$set": { "seen": "seen" },
                    "$addToSet": { "seen_by": viewer },
                },
            )
            .await?;
        Ok(result.modified_count)
    }
}
