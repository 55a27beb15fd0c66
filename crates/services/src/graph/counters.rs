use backbook_db::models::{Message, Reaction, ReactionBreakdown, ReactionStats};
use bson::{doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::Database;
use tracing::warn;

use crate::dao::{
    ChatDao, CommentDao, DaoError, DaoResult, FollowDao, FriendRequestDao, NotificationDao,
    PostDao, UserDao,
};

/// Recomputes every denormalized counter from its source collection and
/// writes the absolute value back. Counters are never incremented in place;
/// a recompute after a failed previous recompute self-heals the value.
pub struct CounterService {
    users: UserDao,
    posts: PostDao,
    requests: FriendRequestDao,
    follows: FollowDao,
    comments: CommentDao,
    chats: ChatDao,
    notifications: NotificationDao,
    reactions: mongodb::Collection<Reaction>,
}

impl CounterService {
    pub fn new(db: &Database) -> Self {
        Self {
            users: UserDao::new(db),
            posts: PostDao::new(db),
            requests: FriendRequestDao::new(db),
            follows: FollowDao::new(db),
            comments: CommentDao::new(db),
            chats: ChatDao::new(db),
            notifications: NotificationDao::new(db),
            reactions: db.collection(Reaction::COLLECTION),
        }
    }

    /// Count of accepted friend requests involving the user, in either
    /// direction.
    pub async fn recompute_friends_count(&self, user_id: ObjectId) -> DaoResult<u64> {
        let count = self
            .requests
            .base
            .count(doc! {
                "$or": [{ "sender": user_id }, { "recipient": user_id }],
                "status": "accepted",
            })
            .await?;
        self.users.update_friends_count(user_id, count).await?;
        Ok(count)
    }

    /// Following comes from edges the user sent, followers from edges the
    /// user received. Both are written together.
    pub async fn recompute_follow_counts(
        &self,
        user_id: ObjectId,
    ) -> DaoResult<(u64, u64)> {
        let following = self
            .follows
            .base
            .count(doc! { "sender": user_id })
            .await?;
        let followers = self
            .follows
            .base
            .count(doc! { "recipient": user_id })
            .await?;
        self.users
            .update_follow_counts(user_id, following, followers)
            .await?;
        Ok((following, followers))
    }

    /// Groups the post's reactions by kind and stores the absolute
    /// breakdown on the post.
    pub async fn recompute_reaction_stats(
        &self,
        post_id: ObjectId,
    ) -> DaoResult<ReactionStats> {
        let pipeline = vec![
            doc! { "$match": { "post_id": post_id } },
            doc! { "$group": { "_id": "$reaction", "count": { "$sum": 1 } } },
        ];

        let mut cursor = self
            .reactions
            .aggregate(pipeline)
            .await
            .map_err(DaoError::Mongo)?;

        let mut types = ReactionBreakdown::default();
        let mut total_count = 0u32;
        while let Some(group) = cursor.try_next().await.map_err(DaoError::Mongo)? {
            let count = group.get_i32("count").unwrap_or(0) as u32;
            total_count += count;
            match group.get_str("_id").unwrap_or_default() {
                "like" => types.like = count,
                "love" => types.love = count,
                "haha" => types.haha = count,
                "wow" => types.wow = count,
                "sad" => types.sad = count,
                "angry" => types.angry = count,
                _ => {}
            }
        }

        let stats = ReactionStats { total_count, types };
        self.posts.update_reaction_stats(post_id, &stats).await?;
        Ok(stats)
    }

    /// Counts every comment and reply on the post and refreshes the
    /// newest-comment pointer alongside.
    pub async fn recompute_comments_count(&self, post_id: ObjectId) -> DaoResult<u64> {
        let count = self
            .comments
            .base
            .count(doc! { "post_id": post_id })
            .await?;
        let last = self.comments.latest_for(post_id).await?;
        self.posts
            .update_comment_summary(post_id, count, last.and_then(|c| c.id))
            .await?;
        Ok(count)
    }

    /// Counts live share posts pointing at the post. Deleting a share
    /// post and recomputing brings the count back down.
    pub async fn recompute_shares_count(&self, post_id: ObjectId) -> DaoResult<u64> {
        let count = self
            .posts
            .base
            .count(doc! {
                "kind": "share",
                "shared_post_id": post_id,
                "deleted": false,
            })
            .await?;
        self.posts.update_shares_count(post_id, count).await?;
        Ok(count)
    }

    /// A chat counts as unseen when its latest message is unseen and was
    /// not sent by the user. One chat contributes at most one, no matter
    /// how many messages piled up in it.
    pub async fn recompute_unseen_messages(&self, user_id: ObjectId) -> DaoResult<u64> {
        let pipeline = vec![
            doc! { "$match": {
                "members": user_id,
                "latest_message_id": { "$ne": null },
            } },
            doc! { "$lookup": {
                "from": Message::COLLECTION,
                "localField": "latest_message_id",
                "foreignField": "_id",
                "as": "latest_message",
            } },
            doc! { "$unwind": "$latest_message" },
            doc! { "$match": {
                "latest_message.seen": "unseen",
                "latest_message.sender_id": { "$ne": user_id },
            } },
            doc! { "$count": "unseen" },
        ];

        let mut cursor = self
            .chats
            .base
            .collection()
            .aggregate(pipeline)
            .await
            .map_err(DaoError::Mongo)?;

        let count = match cursor.try_next().await.map_err(DaoError::Mongo)? {
            Some(result) => result.get_i32("unseen").unwrap_or(0) as u64,
            None => 0,
        };
        self.users.update_unseen_messages(user_id, count).await?;
        Ok(count)
    }

    /// Refreshes the unseen tally of every chat member. New messages can
    /// also lower the sender's own count, when their send replaces an
    /// unseen latest message from someone else.
    pub async fn recompute_unseen_messages_for_chat(
        &self,
        chat_id: ObjectId,
    ) -> DaoResult<()> {
        let Some(chat) = self.chats.find_by_id(chat_id).await? else {
            return Ok(());
        };
        for member in chat.members {
            self.recompute_unseen_messages(member).await?;
        }
        Ok(())
    }

    pub async fn recompute_unseen_notifications(
        &self,
        user_id: ObjectId,
    ) -> DaoResult<u64> {
        let count = self
            .notifications
            .base
            .count(doc! { "recipient": user_id, "seen": false })
            .await?;
        self.users
            .update_unseen_notifications(user_id, count)
            .await?;
        Ok(count)
    }

    /// A failed recompute never fails the operation that triggered it. The
    /// graph write already happened; the stale counter heals on the next
    /// recompute touching the same user or post.
    pub fn degraded(context: &str, err: DaoError) -> String {
        warn!(context, error = %err, "Counter recomputation failed");
        format!("{context} counters could not be refreshed")
    }
}
