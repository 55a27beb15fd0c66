use backbook_db::models::{FriendRequest, FriendRequestStatus};
use bson::oid::ObjectId;
use serde::Serialize;

/// Where two users stand with each other, derived from the friend request
/// between them. A cancelled request is indistinguishable from no request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipState {
    None,
    Friends,
    RequestSent,
    RequestReceived,
}

impl RelationshipState {
    pub fn derive(viewer: ObjectId, request: Option<&FriendRequest>) -> Self {
        match request {
            None => Self::None,
            Some(r) => match r.status {
                FriendRequestStatus::Cancelled => Self::None,
                FriendRequestStatus::Accepted => Self::Friends,
                FriendRequestStatus::Pending if r.sender == viewer => Self::RequestSent,
                FriendRequestStatus::Pending => Self::RequestReceived,
            },
        }
    }
}

/// The viewer-relative relationship flags returned with profiles and after
/// every graph mutation. Exactly one of the four states holds, so at most
/// one of `friends`, `request_sent` and `request_received` is true.
#[derive(Debug, Clone, Serialize)]
pub struct RelationshipView {
    pub friends: bool,
    pub following: bool,
    pub request_sent: bool,
    pub request_received: bool,
    /// Id of the live request, present unless the state is `None`. Lets the
    /// client call accept, cancel or unfriend without another lookup.
    pub request_id: Option<String>,
}

impl RelationshipView {
    pub fn new(viewer: ObjectId, request: Option<&FriendRequest>, following: bool) -> Self {
        let state = RelationshipState::derive(viewer, request);
        let request_id = match state {
            RelationshipState::None => None,
            _ => request.and_then(|r| r.id).map(|id| id.to_hex()),
        };
        Self {
            friends: state == RelationshipState::Friends,
            following,
            request_sent: state == RelationshipState::RequestSent,
            request_received: state == RelationshipState::RequestReceived,
            request_id,
        }
    }
}
