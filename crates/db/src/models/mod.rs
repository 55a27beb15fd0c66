pub mod chat;
pub mod comment;
pub mod follow;
pub mod friend_request;
pub mod message;
pub mod notification;
pub mod post;
pub mod reaction;
pub mod user;

pub use chat::{Chat, ChatKind};
pub use comment::Comment;
pub use follow::Follow;
pub use friend_request::{FriendRequest, FriendRequestStatus};
pub use message::{Message, MessageKind, SeenState};
pub use notification::{Notification, NotificationKind};
pub use post::{Post, PostKind, ReactionBreakdown, ReactionStats};
pub use reaction::{Reaction, ReactionKind};
pub use user::{SavedPost, SearchEntry, User, UserDetails};
