use axum::{Json, extract::State};
use backbook_services::CounterService;
use bson::oid::ObjectId;
use serde::Serialize;

use super::{UserCard, card_for};
use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: String,
    pub sender: UserCard,
    pub kind: String,
    pub content: String,
    pub link: String,
    pub seen: bool,
    pub created_at: String,
}

/// Newest first. Opening the list marks the batch seen, so the unseen badge
/// resets to zero.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let notifications = state.notifications.list_for_user(auth.user_id).await?;

    let sender_ids: Vec<ObjectId> = notifications.iter().map(|n| n.sender).collect();
    let senders = state.users.find_many_by_ids(&sender_ids).await?;

    let items: Vec<NotificationResponse> = notifications
        .into_iter()
        .filter_map(|n| {
            let sender = card_for(&senders, n.sender)?;
            Some(NotificationResponse {
                id: n.id?.to_hex(),
                sender,
                kind: n.kind.as_str().to_string(),
                content: n.content,
                link: n.link,
                seen: n.seen,
                created_at: n.created_at.try_to_rfc3339_string().unwrap_or_default(),
            })
        })
        .collect();

    state.notifications.mark_all_seen(auth.user_id).await?;

    let mut body = serde_json::json!({ "items": items });
    if let Err(e) = state
        .counters
        .recompute_unseen_notifications(auth.user_id)
        .await
    {
        body["counter_warning"] = CounterService::degraded("notification", e).into();
    }
    Ok(Json(body))
}

pub async fn mark_seen(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.notifications.mark_all_seen(auth.user_id).await?;

    let mut body = serde_json::json!({ "message": "Notifications seen" });
    if let Err(e) = state
        .counters
        .recompute_unseen_notifications(auth.user_id)
        .await
    {
        body["counter_warning"] = CounterService::degraded("notification", e).into();
    }
    Ok(Json(body))
}
