use backbook_db::models::{Reaction, ReactionKind};
use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct ReactionDao {
    pub base: BaseDao<Reaction>,
}

impl ReactionDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Reaction::COLLECTION),
        }
    }

    pub async fn find_user_reaction(
        &self,
        post_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<Option<Reaction>> {
        self.base
            .find_one(doc! { "post_id": post_id, "user_id": user_id })
            .await
    }

    /// The viewer's reactions across a page of posts, for feed annotation.
    pub async fn find_user_reactions(
        &self,
        user_id: ObjectId,
        post_ids: &[ObjectId],
    ) -> DaoResult<Vec<Reaction>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.base
            .find_many(
                doc! { "user_id": user_id, "post_id": { "$in": post_ids.to_vec() } },
                None,
            )
            .await
    }

    /// Toggle semantics: same kind again removes the reaction, a different
    /// kind overwrites it. Returns the kind now in effect, or `None` when
    /// the reaction was removed.
    pub async fn toggle(
        &self,
        post_id: ObjectId,
        user_id: ObjectId,
        kind: ReactionKind,
    ) -> DaoResult<Option<ReactionKind>> {
        match self.find_user_reaction(post_id, user_id).await? {
            Some(existing) if existing.reaction == kind => {
                self.base
                    .hard_delete(doc! { "post_id": post_id, "user_id": user_id })
                    .await?;
                Ok(None)
            }
            Some(_) => {
                self.overwrite(post_id, user_id, kind).await?;
                Ok(Some(kind))
            }
            None => {
                let reaction = Reaction {
                    id: None,
                    post_id,
                    user_id,
                    reaction: kind,
                    created_at: DateTime::now(),
                };
                match self.base.insert_one(&reaction).await {
                    Ok(_) => Ok(Some(kind)),
                    // Lost a race against a concurrent toggle on the same
                    // (post, user); the record exists, so overwrite it.
                    Err(DaoError::DuplicateKey(_)) => {
                        self.overwrite(post_id, user_id, kind).await?;
                        Ok(Some(kind))
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }

    async fn overwrite(
        &self,
        post_id: ObjectId,
        user_id: ObjectId,
        kind: ReactionKind,
    ) -> DaoResult<()> {
        self.base
            .collection()
            .update_one(
                doc! { "post_id": post_id, "user_id": user_id },
                doc! {
                    "$set": {
                        "reaction": kind.as_str(),
                        "created_at": DateTime::now(),
                    }
                },
            )
            .await?;
        Ok(())
    }
}
