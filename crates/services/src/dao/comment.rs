use backbook_db::models::Comment;
use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;

use super::base::{BaseDao, DaoResult, PaginatedResult, PaginationParams};

pub struct CommentDao {
    pub base: BaseDao<Comment>,
}

impl CommentDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Comment::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        post_id: ObjectId,
        user_id: ObjectId,
        parent_id: Option<ObjectId>,
        text: Option<String>,
        image: Option<String>,
    ) -> DaoResult<Comment> {
        let comment = Comment {
            id: None,
            post_id,
            user_id,
            parent_id,
            text,
            image,
            likes: Vec::new(),
            created_at: DateTime::now(),
        };

        let id = self.base.insert_one(&comment).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_id(&self, id: ObjectId) -> DaoResult<Option<Comment>> {
        self.base.find_one(doc! { "_id": id }).await
    }

    /// Deletes a comment along with its replies.
    pub async fn delete_with_replies(&self, id: ObjectId) -> DaoResult<u64> {
        self.base
            .hard_delete(doc! { "$or": [{ "_id": id }, { "parent_id": id }] })
            .await
    }

    /// Returns (liked now, like count) after the toggle.
    pub async fn toggle_like(
        &self,
        comment_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<(bool, u64)> {
        let comment = self.base.find_by_id(comment_id).await?;
        let liked = comment.likes.contains(&user_id);

        let update = if liked {
            doc! { "$pull": { "likes": user_id } }
        } else {
            doc! { "$addToSet": { "likes": user_id } }
        };
        self.base
            .collection()
            .update_one(doc! { "_id": comment_id }, update)
            .await?;

        let refreshed = self.base.find_by_id(comment_id).await?;
        Ok((!liked, refreshed.likes.len() as u64))
    }

    pub async fn list_top_level(
        &self,
        post_id: ObjectId,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<Comment>> {
        self.base
            .find_paginated(
                doc! { "post_id": post_id, "parent_id": null },
                Some(doc! { "created_at": -1 }),
                params,
            )
            .await
    }

    pub async fn replies_for(&self, parent_ids: &[ObjectId]) -> DaoResult<Vec<Comment>> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.base
            .find_many(
                doc! { "parent_id": { "$in": parent_ids.to_vec() } },
                Some(doc! { "created_at": 1 }),
            )
            .await
    }

    pub async fn latest_for(&self, post_id: ObjectId) -> DaoResult<Option<Comment>> {
        let mut latest = self
            .base
            .find_paginated(
                doc! { "post_id": post_id },
                Some(doc! { "created_at": -1 }),
                &PaginationParams { page: 1, per_page: 1 },
            )
            .await?;
        Ok(latest.items.pop())
    }
}
