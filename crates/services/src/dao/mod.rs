pub mod base;
pub mod chat;
pub mod comment;
pub mod follow;
pub mod friend_request;
pub mod message;
pub mod notification;
pub mod post;
pub mod reaction;
pub mod user;

pub use base::{BaseDao, DaoError, DaoResult, PaginatedResult, PaginationParams};
pub use chat::ChatDao;
pub use comment::CommentDao;
pub use follow::FollowDao;
pub use friend_request::FriendRequestDao;
pub use message::MessageDao;
pub use notification::NotificationDao;
pub use post::PostDao;
pub use reaction::ReactionDao;
pub use user::UserDao;
