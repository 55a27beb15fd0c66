use backbook_db::models::{FriendRequest, FriendRequestStatus};
use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;

use super::base::{BaseDao, DaoResult};

pub struct FriendRequestDao {
    pub base: BaseDao<FriendRequest>,
}

impl FriendRequestDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, FriendRequest::COLLECTION),
        }
    }

    /// Races on the same pair surface as `DaoError::DuplicateKey` from the
    /// unique (sender, recipient) index.
    pub async fn create(
        &self,
        sender: ObjectId,
        recipient: ObjectId,
    ) -> DaoResult<FriendRequest> {
        let now = DateTime::now();
        let request = FriendRequest {
            id: None,
            sender,
            recipient,
            status: FriendRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&request).await?;
        self.base.find_by_id(id).await
    }

    /// The request between a pair, in either direction. A live request is
    /// preferred over a cancelled leftover when both directions exist.
    pub async fn find_between(
        &self,
        a: ObjectId,
        b: ObjectId,
    ) -> DaoResult<Option<FriendRequest>> {
        let mut requests = self
            .base
            .find_many(
                doc! {
                    "$or": [
                        { "sender": a, "recipient": b },
                        { "sender": b, "recipient": a },
                    ]
                },
                None,
            )
            .await?;

        if let Some(pos) = requests
            .iter()
            .position(|r| r.status != FriendRequestStatus::Cancelled)
        {
            return Ok(Some(requests.swap_remove(pos)));
        }
        Ok(requests.pop())
    }

    pub async fn find_by_id(&self, id: ObjectId) -> DaoResult<Option<FriendRequest>> {
        self.base.find_one(doc! { "_id": id }).await
    }

    pub async fn set_status(
        &self,
        id: ObjectId,
        status: FriendRequestStatus,
    ) -> DaoResult<bool> {
        self.base
            .update_by_id(
                id,
                doc! { "$set": { "status": bson::to_bson(&status).map_err(bson::ser::Error::from)? } },
            )
            .await
    }

    pub async fn delete_by_id(&self, id: ObjectId) -> DaoResult<bool> {
        Ok(self.base.hard_delete(doc! { "_id": id }).await? > 0)
    }

    pub async fn delete_cancelled(
        &self,
        sender: ObjectId,
        recipient: ObjectId,
    ) -> DaoResult<u64> {
        self.base
            .hard_delete(doc! {
                "sender": sender,
                "recipient": recipient,
                "status": "cancelled",
            })
            .await
    }

    pub async fn accepted_for(&self, user_id: ObjectId) -> DaoResult<Vec<FriendRequest>> {
        self.base
            .find_many(
                doc! {
                    "$or": [{ "sender": user_id }, { "recipient": user_id }],
                    "status": "accepted",
                },
                Some(doc! { "updated_at": -1 }),
            )
            .await
    }

    pub async fn pending_sent_by(&self, user_id: ObjectId) -> DaoResult<Vec<FriendRequest>> {
        self.base
            .find_many(
                doc! { "sender": user_id, "status": "pending" },
                Some(doc! { "created_at": -1 }),
            )
            .await
    }

    pub async fn pending_received_for(
        &self,
        user_id: ObjectId,
    ) -> DaoResult<Vec<FriendRequest>> {
        self.base
            .find_many(
                doc! { "recipient": user_id, "status": "pending" },
                Some(doc! { "created_at": -1 }),
            )
            .await
    }
}
