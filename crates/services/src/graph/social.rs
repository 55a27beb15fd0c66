use backbook_db::models::{FriendRequestStatus, User};
use bson::{doc, oid::ObjectId};
use mongodb::Database;
use thiserror::Error;

use super::counters::CounterService;
use super::relationship::RelationshipView;
use crate::dao::{DaoError, FollowDao, FriendRequestDao, UserDao};
use crate::notify::NotificationService;

/// Absent, wrong-status and wrong-party lookups all get the same answer,
/// so callers cannot probe requests they are not part of.
const NO_MATCHING_REQUEST: &str = "No matching friend request";

#[derive(Debug, Error)]
pub enum SocialError {
    /// The actor targeted themselves.
    #[error("{0}")]
    InvalidAction(String),
    #[error("{0}")]
    NotFound(String),
    /// The graph is not in the state the transition requires.
    #[error("{0}")]
    PreconditionFailed(String),
    #[error(transparent)]
    Storage(#[from] DaoError),
}

/// What a successful graph mutation hands back to the route layer.
#[derive(Debug)]
pub struct SocialOutcome {
    pub message: &'static str,
    pub relationship: RelationshipView,
    /// Set when a counter recompute failed after the graph write went
    /// through. The mutation still succeeded.
    pub counter_warning: Option<String>,
}

/// Coordinates every friend and follow transition: validates the current
/// state, applies the graph writes, recomputes the affected counters and
/// dispatches notifications. Counter failures degrade to a warning; the
/// graph write is never rolled back.
pub struct SocialService {
    users: UserDao,
    requests: FriendRequestDao,
    follows: FollowDao,
    counters: CounterService,
}

impl SocialService {
    pub fn new(db: &Database) -> Self {
        Self {
            users: UserDao::new(db),
            requests: FriendRequestDao::new(db),
            follows: FollowDao::new(db),
            counters: CounterService::new(db),
        }
    }

    /// The viewer-relative relationship flags for a profile read.
    pub async fn relationship_view(
        &self,
        viewer: ObjectId,
        other: ObjectId,
    ) -> Result<RelationshipView, SocialError> {
        let request = self.requests.find_between(viewer, other).await?;
        let following = self.follows.exists(viewer, other).await?;
        Ok(RelationshipView::new(viewer, request.as_ref(), following))
    }

    /// Sends a friend request. A cancelled request in the same direction is
    /// revived in place; one in the opposite direction is deleted so the
    /// new sender starts fresh. A fresh request also follows the recipient.
    pub async fn add_friend(
        &self,
        notifier: &NotificationService,
        actor: ObjectId,
        target: ObjectId,
    ) -> Result<SocialOutcome, SocialError> {
        if actor == target {
            return Err(SocialError::InvalidAction(
                "You cannot send a friend request to yourself".into(),
            ));
        }
        let recipient = self.load_user(target).await?;
        let sender = self.load_user(actor).await?;

        let existing = self.requests.find_between(actor, target).await?;
        let mut followed = false;
        match existing {
            Some(r) if r.status == FriendRequestStatus::Accepted => {
                return Err(SocialError::PreconditionFailed(
                    "You are already friends with this user".into(),
                ));
            }
            Some(r) if r.status == FriendRequestStatus::Pending => {
                let reason = if r.sender == actor {
                    "Friend request already sent"
                } else {
                    "This user already sent you a friend request"
                };
                return Err(SocialError::PreconditionFailed(reason.into()));
            }
            Some(r) if r.sender == actor => {
                // Revive the cancelled request; any follow from the first
                // send is still there, so none is added.
                let id = r.id.ok_or(DaoError::NotFound)?;
                self.requests
                    .set_status(id, FriendRequestStatus::Pending)
                    .await?;
            }
            Some(r) => {
                // Cancelled in the opposite direction. Clear the leftover
                // so the unique index accepts the new direction.
                self.requests.delete_cancelled(r.sender, r.recipient).await?;
                followed = self.create_request(actor, target).await?;
            }
            None => {
                followed = self.create_request(actor, target).await?;
            }
        }

        let mut warning = self.refresh_friend_counters(actor, target).await;
        if followed {
            warning = self.refresh_follow_counters(actor, target).await.or(warning);
        }

        notifier.friend_request(&sender, &recipient).await;

        let relationship = self.relationship_view(actor, target).await?;
        Ok(SocialOutcome {
            message: "Friend request sent",
            relationship,
            counter_warning: warning,
        })
    }

    /// Only the recipient of a pending request can accept. Accepting
    /// creates the follow-back edge, making the follow graph mutual.
    pub async fn accept_request(
        &self,
        notifier: &NotificationService,
        actor: ObjectId,
        request_id: ObjectId,
    ) -> Result<SocialOutcome, SocialError> {
        let request = match self.requests.find_by_id(request_id).await? {
            Some(r) if r.status == FriendRequestStatus::Pending && r.recipient == actor => r,
            _ => {
                return Err(SocialError::PreconditionFailed(NO_MATCHING_REQUEST.into()));
            }
        };

        self.requests
            .set_status(request_id, FriendRequestStatus::Accepted)
            .await?;

        if !self.follows.exists(actor, request.sender).await? {
            match self.follows.create(actor, request.sender).await {
                Ok(_) | Err(DaoError::DuplicateKey(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        let mut warning = self.refresh_friend_counters(actor, request.sender).await;
        warning = self
            .refresh_follow_counters(actor, request.sender)
            .await
            .or(warning);

        let accepter = self.load_user(actor).await?;
        let sender = self.load_user(request.sender).await?;
        notifier.friend_accept(&accepter, &sender).await;

        let relationship = self.relationship_view(actor, request.sender).await?;
        Ok(SocialOutcome {
            message: "Friend request accepted",
            relationship,
            counter_warning: warning,
        })
    }

    /// Either party can cancel a pending request. The sender withdraws it,
    /// the recipient declines it; both land on the same cancelled state.
    pub async fn cancel_request(
        &self,
        actor: ObjectId,
        request_id: ObjectId,
    ) -> Result<SocialOutcome, SocialError> {
        let request = match self.requests.find_by_id(request_id).await? {
            Some(r)
                if r.status == FriendRequestStatus::Pending
                    && (r.sender == actor || r.recipient == actor) =>
            {
                r
            }
            _ => {
                return Err(SocialError::PreconditionFailed(NO_MATCHING_REQUEST.into()));
            }
        };

        self.requests
            .set_status(request_id, FriendRequestStatus::Cancelled)
            .await?;

        // Friend counts cannot change here, but the recompute self-heals
        // any stale value a previously degraded operation left behind.
        let warning = self
            .refresh_friend_counters(request.sender, request.recipient)
            .await;

        let other = request.counterpart(actor);
        let relationship = self.relationship_view(actor, other).await?;
        Ok(SocialOutcome {
            message: "Friend request cancelled",
            relationship,
            counter_warning: warning,
        })
    }

    /// Unfriending deletes the accepted request outright and severs both
    /// follow edges, so either side can start over from a clean slate.
    pub async fn remove_friend(
        &self,
        actor: ObjectId,
        request_id: ObjectId,
    ) -> Result<SocialOutcome, SocialError> {
        let request = match self.requests.find_by_id(request_id).await? {
            Some(r)
                if r.status == FriendRequestStatus::Accepted
                    && (r.sender == actor || r.recipient == actor) =>
            {
                r
            }
            _ => {
                return Err(SocialError::PreconditionFailed(NO_MATCHING_REQUEST.into()));
            }
        };

        self.requests.delete_by_id(request_id).await?;
        self.follows
            .delete_both(request.sender, request.recipient)
            .await?;

        let mut warning = self
            .refresh_friend_counters(request.sender, request.recipient)
            .await;
        warning = self
            .refresh_follow_counters(request.sender, request.recipient)
            .await
            .or(warning);

        let other = request.counterpart(actor);
        let relationship = self.relationship_view(actor, other).await?;
        Ok(SocialOutcome {
            message: "Friend removed",
            relationship,
            counter_warning: warning,
        })
    }

    /// Follows without friendship. Friend requests manage their own edges;
    /// this is the standalone path.
    pub async fn follow(
        &self,
        notifier: &NotificationService,
        actor: ObjectId,
        target: ObjectId,
    ) -> Result<SocialOutcome, SocialError> {
        if actor == target {
            return Err(SocialError::InvalidAction(
                "You cannot follow yourself".into(),
            ));
        }
        let followed = self.load_user(target).await?;
        let follower = self.load_user(actor).await?;

        if self.follows.exists(actor, target).await? {
            return Err(SocialError::PreconditionFailed(
                "Already following this user".into(),
            ));
        }
        match self.follows.create(actor, target).await {
            Ok(_) => {}
            Err(DaoError::DuplicateKey(_)) => {
                return Err(SocialError::PreconditionFailed(
                    "Already following this user".into(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        let warning = self.refresh_follow_counters(actor, target).await;
        notifier.follow(&follower, &followed).await;

        let relationship = self.relationship_view(actor, target).await?;
        Ok(SocialOutcome {
            message: "Followed",
            relationship,
            counter_warning: warning,
        })
    }

    pub async fn unfollow(
        &self,
        actor: ObjectId,
        target: ObjectId,
    ) -> Result<SocialOutcome, SocialError> {
        if actor == target {
            return Err(SocialError::InvalidAction(
                "You cannot unfollow yourself".into(),
            ));
        }
        if !self.users.exists(target).await? {
            return Err(SocialError::NotFound("User not found".into()));
        }
        if !self.follows.delete(actor, target).await? {
            return Err(SocialError::PreconditionFailed(
                "Not following this user".into(),
            ));
        }

        let warning = self.refresh_follow_counters(actor, target).await;
        let relationship = self.relationship_view(actor, target).await?;
        Ok(SocialOutcome {
            message: "Unfollowed",
            relationship,
            counter_warning: warning,
        })
    }

    /// Inserts the pending request plus the sender's follow edge. Returns
    /// whether a new follow edge was created. A duplicate-key error means
    /// a concurrent send won the insert.
    async fn create_request(
        &self,
        actor: ObjectId,
        target: ObjectId,
    ) -> Result<bool, SocialError> {
        match self.requests.create(actor, target).await {
            Ok(_) => {}
            Err(DaoError::DuplicateKey(_)) => {
                return Err(SocialError::PreconditionFailed(
                    "Friend request already sent".into(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        if self.follows.exists(actor, target).await? {
            return Ok(false);
        }
        match self.follows.create(actor, target).await {
            Ok(_) => Ok(true),
            Err(DaoError::DuplicateKey(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn refresh_friend_counters(&self, a: ObjectId, b: ObjectId) -> Option<String> {
        let mut warning = None;
        for user in [a, b] {
            if let Err(e) = self.counters.recompute_friends_count(user).await {
                warning = Some(CounterService::degraded("friend", e));
            }
        }
        warning
    }

    async fn refresh_follow_counters(&self, a: ObjectId, b: ObjectId) -> Option<String> {
        let mut warning = None;
        for user in [a, b] {
            if let Err(e) = self.counters.recompute_follow_counts(user).await {
                warning = Some(CounterService::degraded("follow", e));
            }
        }
        warning
    }

    async fn load_user(&self, id: ObjectId) -> Result<User, SocialError> {
        self.users
            .base
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| SocialError::NotFound("User not found".into()))
    }
}
