mod push;

use backbook_config::Settings;
use backbook_db::models::{NotificationKind, User};
use bson::{doc, oid::ObjectId};
use mongodb::Database;
use serde_json::json;
use tracing::warn;

use crate::dao::{NotificationDao, UserDao};
use crate::graph::CounterService;
use push::PushSender;

/// Stores notification records, keeps the recipient's unseen tally fresh
/// and pushes to the browser when the recipient has a subscription. Every
/// step is best-effort; a notification failure never fails the operation
/// that raised it.
pub struct NotificationService {
    notifications: NotificationDao,
    users: UserDao,
    counters: CounterService,
    push: PushSender,
    frontend_url: String,
}

impl NotificationService {
    pub fn new(db: &Database, settings: &Settings) -> Self {
        Self {
            notifications: NotificationDao::new(db),
            users: UserDao::new(db),
            counters: CounterService::new(db),
            push: PushSender::new(&settings.push),
            frontend_url: settings.app.frontend_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn friend_request(&self, sender: &User, recipient: &User) {
        let content = format!(
            "{} {} sent you a friend request",
            sender.first_name, sender.last_name
        );
        let link = format!("/profile/{}", sender.username);
        self.dispatch(sender, recipient, NotificationKind::FriendRequest, content, link)
            .await;
    }

    pub async fn friend_accept(&self, accepter: &User, recipient: &User) {
        let content = format!(
            "{} {} accepted your friend request",
            accepter.first_name, accepter.last_name
        );
        let link = format!("/profile/{}", accepter.username);
        self.dispatch(accepter, recipient, NotificationKind::FriendAccept, content, link)
            .await;
    }

    pub async fn follow(&self, follower: &User, recipient: &User) {
        let content = format!(
            "{} {} started following you",
            follower.first_name, follower.last_name
        );
        let link = format!("/profile/{}", follower.username);
        self.dispatch(follower, recipient, NotificationKind::Follow, content, link)
            .await;
    }

    pub async fn post_react(&self, sender: &User, post_owner: ObjectId, post_id: ObjectId) {
        let Some(recipient) = self.load(post_owner).await else {
            return;
        };
        let content = format!(
            "{} {} reacted to your post",
            sender.first_name, sender.last_name
        );
        let link = format!("/{}/posts/{}", recipient.username, post_id.to_hex());
        self.dispatch(sender, &recipient, NotificationKind::React, content, link)
            .await;
    }

    pub async fn post_comment(&self, sender: &User, post_owner: ObjectId, post_id: ObjectId) {
        let Some(recipient) = self.load(post_owner).await else {
            return;
        };
        let content = format!(
            "{} {} commented on your post",
            sender.first_name, sender.last_name
        );
        let link = format!("/{}/posts/{}", recipient.username, post_id.to_hex());
        self.dispatch(sender, &recipient, NotificationKind::Comment, content, link)
            .await;
    }

    pub async fn chat_message(&self, sender: &User, member: ObjectId) {
        let Some(recipient) = self.load(member).await else {
            return;
        };
        let content = format!(
            "{} {} sent you a message",
            sender.first_name, sender.last_name
        );
        self.dispatch(
            sender,
            &recipient,
            NotificationKind::Message,
            content,
            "/messages".to_string(),
        )
        .await;
    }

    /// Self-notifications are never created.
    async fn dispatch(
        &self,
        sender: &User,
        recipient: &User,
        kind: NotificationKind,
        content: String,
        link: String,
    ) {
        let (Some(sender_id), Some(recipient_id)) = (sender.id, recipient.id) else {
            return;
        };
        if sender_id == recipient_id {
            return;
        }

        if let Err(e) = self
            .notifications
            .create(recipient_id, sender_id, kind, content.clone(), link.clone())
            .await
        {
            warn!(error = %e, "Failed to store notification");
            return;
        }
        if let Err(e) = self
            .counters
            .recompute_unseen_notifications(recipient_id)
            .await
        {
            warn!(error = %e, "Failed to refresh unseen notification count");
        }

        if let Some(subscription) = &recipient.push_subscription {
            let payload = json!({
                "title": format!("{} {}", sender.first_name, sender.last_name),
                "body": content,
                "link": format!("{}{}", self.frontend_url, link),
            });
            self.push.send(subscription, &payload).await;
        }
    }

    async fn load(&self, id: ObjectId) -> Option<User> {
        match self.users.base.find_one(doc! { "_id": id }).await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Failed to load notification recipient");
                None
            }
        }
    }
}
