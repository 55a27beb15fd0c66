use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use backbook_db::models::{
    Chat, ChatKind, Message, SeenState,
    chat::{THEME_MAX, THEME_MIN},
};
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{UserCard, card_for, parse_object_id};
use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize)]
pub struct OpenChatRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 50, message = "Group name must be 1-50 characters"))]
    pub name: String,
    pub users: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RenameRequest {
    #[validate(length(min = 1, max = 50, message = "Group name must be 1-50 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct MemberRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub theme: u32,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub id: String,
    pub kind: String,
    pub name: Option<String>,
    pub members: Vec<UserCard>,
    pub admin_id: Option<String>,
    pub theme: u32,
    pub latest_message: Option<LatestMessage>,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct LatestMessage {
    pub id: String,
    pub sender_id: String,
    pub kind: String,
    pub content: Option<String>,
    pub seen: bool,
    pub created_at: String,
}

/// Opens the private chat with another user, creating it on first contact.
pub async fn open(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<OpenChatRequest>,
) -> Result<(StatusCode, Json<ChatResponse>), ApiError> {
    let target = parse_object_id(&body.user_id, "user_id")?;
    if target == auth.user_id {
        return Err(ApiError::BadRequest(
            "You cannot open a chat with yourself".to_string(),
        ));
    }
    if !state.users.exists(target).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let (chat, created) = state
        .chats
        .find_or_create_private(auth.user_id, target)
        .await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    let response = to_responses(&state, vec![chat]).await?.pop().ok_or_else(|| {
        ApiError::Internal("Chat vanished after creation".to_string())
    })?;
    Ok((status, Json(response)))
}

pub async fn create_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<ChatResponse>), ApiError> {
    body.validate()?;

    let mut members = Vec::with_capacity(body.users.len());
    for id in &body.users {
        let member = parse_object_id(id, "user_id")?;
        if member != auth.user_id && !members.contains(&member) {
            members.push(member);
        }
    }
    if members.len() < 2 {
        return Err(ApiError::BadRequest(
            "A group chat needs at least two other members".to_string(),
        ));
    }
    for member in &members {
        if !state.users.exists(*member).await? {
            return Err(ApiError::NotFound("User not found".to_string()));
        }
    }

    let chat = state
        .chats
        .create_group(body.name, auth.user_id, members)
        .await?;
    let response = to_responses(&state, vec![chat]).await?.pop().ok_or_else(|| {
        ApiError::Internal("Chat vanished after creation".to_string())
    })?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// The viewer's chats, most recently active first.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ChatResponse>>, ApiError> {
    let chats = state.chats.list_for_user(auth.user_id).await?;
    Ok(Json(to_responses(&state, chats).await?))
}

pub async fn rename(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<RenameRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    body.validate()?;
    let chat_id = parse_object_id(&id, "chat_id")?;
    let chat = load_group(&state, chat_id).await?;
    require_admin(&chat, auth.user_id)?;

    state.chats.rename(chat_id, &body.name).await?;
    Ok(Json(serde_json::json!({ "message": "Chat renamed" })))
}

pub async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<MemberRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let chat_id = parse_object_id(&id, "chat_id")?;
    let target = parse_object_id(&body.user_id, "user_id")?;
    let chat = load_group(&state, chat_id).await?;
    require_admin(&chat, auth.user_id)?;

    if chat.members.contains(&target) {
        return Err(ApiError::Conflict("Already a member".to_string()));
    }
    if !state.users.exists(target).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    state.chats.add_member(chat_id, target).await?;
    Ok(Json(serde_json::json!({ "message": "Member added" })))
}

/// The admin removes others; anyone else may only remove themselves. The
/// admin cannot be removed at all.
pub async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<MemberRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let chat_id = parse_object_id(&id, "chat_id")?;
    let target = parse_object_id(&body.user_id, "user_id")?;
    let chat = load_group(&state, chat_id).await?;

    if chat.admin_id == Some(target) {
        return Err(ApiError::BadRequest(
            "The group admin cannot be removed".to_string(),
        ));
    }
    let is_admin = chat.admin_id == Some(auth.user_id);
    if !is_admin && target != auth.user_id {
        return Err(ApiError::Forbidden(
            "Only the admin removes other members".to_string(),
        ));
    }
    if !chat.members.contains(&target) {
        return Err(ApiError::NotFound("Not a member of this chat".to_string()));
    }

    state.chats.remove_member(chat_id, target).await?;
    Ok(Json(serde_json::json!({ "message": "Member removed" })))
}

pub async fn set_theme(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<ThemeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !(THEME_MIN..=THEME_MAX).contains(&body.theme) {
        return Err(ApiError::BadRequest(format!(
            "Theme must be between {THEME_MIN} and {THEME_MAX}"
        )));
    }

    let chat_id = parse_object_id(&id, "chat_id")?;
    if !state.chats.is_member(chat_id, auth.user_id).await? {
        return Err(ApiError::Forbidden("Not a member of this chat".to_string()));
    }

    state.chats.set_theme(chat_id, body.theme).await?;
    Ok(Json(serde_json::json!({ "message": "Theme updated" })))
}

async fn load_group(state: &AppState, chat_id: ObjectId) -> Result<Chat, ApiError> {
    let chat = state
        .chats
        .find_by_id(chat_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Chat not found".to_string()))?;
    if chat.kind != ChatKind::Group {
        return Err(ApiError::BadRequest(
            "Private chats have no group settings".to_string(),
        ));
    }
    Ok(chat)
}

fn require_admin(chat: &Chat, user_id: ObjectId) -> Result<(), ApiError> {
    if chat.admin_id != Some(user_id) {
        return Err(ApiError::Forbidden(
            "Only the group admin can do that".to_string(),
        ));
    }
    Ok(())
}

/// Joins member cards and the latest message onto each chat.
async fn to_responses(
    state: &AppState,
    chats: Vec<Chat>,
) -> Result<Vec<ChatResponse>, ApiError> {
    let member_ids: Vec<ObjectId> = chats.iter().flat_map(|c| c.members.clone()).collect();
    let members = state.users.find_many_by_ids(&member_ids).await?;

    let latest_ids: Vec<ObjectId> =
        chats.iter().filter_map(|c| c.latest_message_id).collect();
    let latest = state.messages.find_many_by_ids(&latest_ids).await?;

    let mut items = Vec::with_capacity(chats.len());
    for chat in chats {
        let cards = chat
            .members
            .iter()
            .filter_map(|id| card_for(&members, *id))
            .collect();
        let latest_message = chat
            .latest_message_id
            .and_then(|id| latest.iter().find(|m| m.id == Some(id)))
            .map(to_latest);
        items.push(ChatResponse {
            id: chat.id.unwrap().to_hex(),
            kind: chat.kind.as_str().to_string(),
            name: chat.name,
            members: cards,
            admin_id: chat.admin_id.map(|id| id.to_hex()),
            theme: chat.theme,
            latest_message,
            updated_at: chat.updated_at.try_to_rfc3339_string().unwrap_or_default(),
        });
    }
    Ok(items)
}

fn to_latest(m: &Message) -> LatestMessage {
    LatestMessage {
        id: m.id.unwrap().to_hex(),
        sender_id: m.sender_id.to_hex(),
        kind: m.kind.as_str().to_string(),
        content: m.content.clone(),
        seen: m.seen == SeenState::Seen,
        created_at: m.created_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}
