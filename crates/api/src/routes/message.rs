use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use backbook_db::models::{Message, MessageKind, SeenState};
use backbook_services::CounterService;
use backbook_services::dao::base::PaginationParams;
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{UserCard, card_for, parse_object_id};
use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub chat_id: String,
    #[serde(default)]
    pub kind: MessageKind,
    #[validate(length(min = 1, max = 400, message = "Message must be 1-400 characters"))]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub chat_id: String,
    pub sender: UserCard,
    pub kind: String,
    pub content: Option<String>,
    pub seen: bool,
    pub created_at: String,
}

pub async fn send(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    body.validate()?;
    match body.kind {
        MessageKind::Text | MessageKind::Info if body.content.is_none() => {
            return Err(ApiError::BadRequest(
                "A text message needs content".to_string(),
            ));
        }
        MessageKind::Image if body.content.is_none() => {
            return Err(ApiError::BadRequest(
                "An image message needs the image URL".to_string(),
            ));
        }
        _ => {}
    }

    let chat_id = parse_object_id(&body.chat_id, "chat_id")?;
    let chat = state
        .chats
        .find_by_id(chat_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Chat not found".to_string()))?;
    if !chat.members.contains(&auth.user_id) {
        return Err(ApiError::Forbidden("Not a member of this chat".to_string()));
    }

    // Members with nothing unseen before this send get a notification; the
    // rest already have an unread pile waiting for them.
    let other_ids: Vec<ObjectId> = chat
        .members
        .iter()
        .copied()
        .filter(|m| *m != auth.user_id)
        .collect();
    let others = state.users.find_many_by_ids(&other_ids).await?;

    let message = state
        .messages
        .create(chat_id, auth.user_id, body.kind, body.content)
        .await?;
    let message_id = message
        .id
        .ok_or_else(|| ApiError::Internal("Message vanished after creation".to_string()))?;
    state.chats.set_latest_message(chat_id, message_id).await?;

    let mut warning = None;
    if let Err(e) = state
        .counters
        .recompute_unseen_messages_for_chat(chat_id)
        .await
    {
        warning = Some(CounterService::degraded("message", e));
    }

    let sender = state.users.base.find_by_id(auth.user_id).await?;
    for member in &others {
        if member.unseen_messages == 0 {
            if let Some(id) = member.id {
                state.notifier.chat_message(&sender, id).await;
            }
        }
    }

    let response = to_response(message, UserCard::from_user(&sender));
    let mut body = serde_json::json!({ "message": response });
    if let Some(w) = warning {
        body["counter_warning"] = w.into();
    }
    Ok((StatusCode::CREATED, Json(body)))
}

/// Newest first. The first page also carries the chat document so the
/// client opens a conversation with one request.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(chat_id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let chat_id = parse_object_id(&chat_id, "chat_id")?;
    let chat = state
        .chats
        .find_by_id(chat_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Chat not found".to_string()))?;
    if !chat.members.contains(&auth.user_id) {
        return Err(ApiError::Forbidden("Not a member of this chat".to_string()));
    }

    let result = state.messages.list_for_chat(chat_id, &params).await?;
    let sender_ids: Vec<ObjectId> = result.items.iter().map(|m| m.sender_id).collect();
    let senders = state.users.find_many_by_ids(&sender_ids).await?;

    let items: Vec<MessageResponse> = result
        .items
        .into_iter()
        .filter_map(|m| {
            let sender = card_for(&senders, m.sender_id)?;
            Some(to_response(m, sender))
        })
        .collect();

    let mut body = serde_json::json!({
        "items": items,
        "total": result.total,
        "page": result.page,
        "per_page": result.per_page,
        "total_pages": result.total_pages,
    });
    if result.page == 1 {
        body["chat"] = serde_json::json!({
            "id": chat.id.unwrap().to_hex(),
            "kind": chat.kind.as_str(),
            "name": chat.name,
            "members": chat.members.iter().map(|m| m.to_hex()).collect::<Vec<_>>(),
            "theme": chat.theme,
        });
    }
    Ok(Json(body))
}

/// Marks everything the others sent in this chat as seen and refreshes the
/// viewer's unseen tally.
pub async fn mark_seen(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(chat_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let chat_id = parse_object_id(&chat_id, "chat_id")?;
    if !state.chats.is_member(chat_id, auth.user_id).await? {
        return Err(ApiError::Forbidden("Not a member of this chat".to_string()));
    }

    state.messages.mark_seen(chat_id, auth.user_id).await?;

    let mut body = serde_json::json!({ "message": "Messages seen" });
    if let Err(e) = state.counters.recompute_unseen_messages(auth.user_id).await {
        body["counter_warning"] = CounterService::degraded("message", e).into();
    }
    Ok(Json(body))
}

fn to_response(m: Message, sender: UserCard) -> MessageResponse {
    MessageResponse {
        id: m.id.unwrap().to_hex(),
        chat_id: m.chat_id.to_hex(),
        sender,
        kind: m.kind.as_str().to_string(),
        content: m.content,
        seen: m.seen == SeenState::Seen,
        created_at: m.created_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}
