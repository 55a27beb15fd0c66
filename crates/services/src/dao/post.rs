use backbook_db::models::{Post, PostKind, ReactionStats};
use bson::{Bson, DateTime, doc, oid::ObjectId};
use mongodb::Database;

use super::base::{BaseDao, DaoResult, PaginatedResult, PaginationParams};

pub struct PostDao {
    pub base: BaseDao<Post>,
}

impl PostDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Post::COLLECTION),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        user_id: ObjectId,
        kind: PostKind,
        text: Option<String>,
        images: Vec<String>,
        background: Option<String>,
        shared_post_id: Option<ObjectId>,
    ) -> DaoResult<Post> {
        let now = DateTime::now();
        let post = Post {
            id: None,
            user_id,
            kind,
            text,
            images,
            background,
            shared_post_id,
            reactions: ReactionStats::default(),
            comments_count: 0,
            shares_count: 0,
            last_comment_id: None,
            deleted: false,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&post).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_live(&self, id: ObjectId) -> DaoResult<Option<Post>> {
        self.base.find_one(doc! { "_id": id, "deleted": false }).await
    }

    /// Timeline of the given authors, newest first. The caller passes the
    /// viewer plus everyone the viewer follows.
    pub async fn feed(
        &self,
        author_ids: Vec<ObjectId>,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<Post>> {
        self.base
            .find_paginated(
                doc! { "user_id": { "$in": author_ids }, "deleted": false },
                Some(doc! { "created_at": -1 }),
                params,
            )
            .await
    }

    pub async fn by_user(
        &self,
        user_id: ObjectId,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<Post>> {
        self.base
            .find_paginated(
                doc! { "user_id": user_id, "deleted": false },
                Some(doc! { "created_at": -1 }),
                params,
            )
            .await
    }

    /// Owner-only soft delete; returns false when the post is not the
    /// actor's or already gone.
    pub async fn soft_delete(&self, id: ObjectId, owner: ObjectId) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! { "_id": id, "user_id": owner, "deleted": false },
                doc! { "$set": { "deleted": true } },
            )
            .await
    }

    pub async fn update_reaction_stats(
        &self,
        post_id: ObjectId,
        stats: &ReactionStats,
    ) -> DaoResult<bool> {
        self.base
            .update_by_id(
                post_id,
                doc! { "$set": { "reactions": bson::to_bson(stats).map_err(bson::ser::Error::from)? } },
            )
            .await
    }

    pub async fn update_comment_summary(
        &self,
        post_id: ObjectId,
        count: u64,
        last_comment_id: Option<ObjectId>,
    ) -> DaoResult<bool> {
        let last: Bson = match last_comment_id {
            Some(id) => Bson::ObjectId(id),
            None => Bson::Null,
        };
        self.base
            .update_by_id(
                post_id,
                doc! {
                    "$set": {
                        "comments_count": count as i64,
                        "last_comment_id": last,
                    }
                },
            )
            .await
    }

    pub async fn update_shares_count(&self, post_id: ObjectId, count: u64) -> DaoResult<bool> {
        self.base
            .update_by_id(post_id, doc! { "$set": { "shares_count": count as i64 } })
            .await
    }
}
