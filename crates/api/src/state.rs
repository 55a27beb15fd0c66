use backbook_config::Settings;
use backbook_services::{
    AuthService, CounterService, NotificationService, SocialService,
    dao::{
        chat::ChatDao, comment::CommentDao, follow::FollowDao,
        friend_request::FriendRequestDao, message::MessageDao,
        notification::NotificationDao, post::PostDao, reaction::ReactionDao,
        user::UserDao,
    },
};
use mongodb::Database;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserDao>,
    pub requests: Arc<FriendRequestDao>,
    pub follows: Arc<FollowDao>,
    pub posts: Arc<PostDao>,
    pub reactions: Arc<ReactionDao>,
    pub comments: Arc<CommentDao>,
    pub chats: Arc<ChatDao>,
    pub messages: Arc<MessageDao>,
    pub notifications: Arc<NotificationDao>,
    pub social: Arc<SocialService>,
    pub counters: Arc<CounterService>,
    pub notifier: Arc<NotificationService>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        let auth = Arc::new(AuthService::new(settings.jwt.clone()));
        let users = Arc::new(UserDao::new(&db));
        let requests = Arc::new(FriendRequestDao::new(&db));
        let follows = Arc::new(FollowDao::new(&db));
        let posts = Arc::new(PostDao::new(&db));
        let reactions = Arc::new(ReactionDao::new(&db));
        let comments = Arc::new(CommentDao::new(&db));
        let chats = Arc::new(ChatDao::new(&db));
        let messages = Arc::new(MessageDao::new(&db));
        let notifications = Arc::new(NotificationDao::new(&db));
        let social = Arc::new(SocialService::new(&db));
        let counters = Arc::new(CounterService::new(&db));
        let notifier = Arc::new(NotificationService::new(&db, &settings));

        Self {
            db,
            settings,
            auth,
            users,
            requests,
            follows,
            posts,
            reactions,
            comments,
            chats,
            messages,
            notifications,
            social,
            counters,
            notifier,
        }
    }
}
