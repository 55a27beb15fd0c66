pub mod auth;
pub mod dao;
pub mod graph;
pub mod notify;

pub use auth::AuthService;
pub use dao::*;
pub use graph::{CounterService, RelationshipView, SocialError, SocialOutcome, SocialService};
pub use notify::NotificationService;
