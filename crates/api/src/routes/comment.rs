use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use backbook_db::models::Comment;
use backbook_services::CounterService;
use backbook_services::dao::base::PaginationParams;
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{UserCard, card_for, parse_object_id};
use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 250, message = "Comment must be 1-250 characters"))]
    pub text: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReplyRequest {
    #[validate(length(min = 1, max = 250, message = "Comment must be 1-250 characters"))]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub user: UserCard,
    pub parent_id: Option<String>,
    pub text: Option<String>,
    pub image: Option<String>,
    pub likes_count: u32,
    pub liked_by_viewer: bool,
    pub replies: Vec<CommentResponse>,
    pub created_at: String,
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    body.validate()?;
    if body.text.is_none() && body.image.is_none() {
        return Err(ApiError::BadRequest(
            "A comment needs text or an image".to_string(),
        ));
    }

    let pid = parse_object_id(&id, "post_id")?;
    let post = state
        .posts
        .find_live(pid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    let comment = state
        .comments
        .create(pid, auth.user_id, None, body.text, body.image)
        .await?;

    let mut warning = None;
    if let Err(e) = state.counters.recompute_comments_count(pid).await {
        warning = Some(CounterService::degraded("comment", e));
    }

    let viewer = state.users.base.find_by_id(auth.user_id).await?;
    state.notifier.post_comment(&viewer, post.user_id, pid).await;

    let response = to_response(comment, UserCard::from_user(&viewer), auth.user_id, Vec::new());
    let mut body = serde_json::json!({ "comment": response });
    if let Some(w) = warning {
        body["counter_warning"] = w.into();
    }
    Ok((StatusCode::CREATED, Json(body)))
}

/// Top-level comments newest first, each with its replies oldest first.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let pid = parse_object_id(&id, "post_id")?;
    if state.posts.find_live(pid).await?.is_none() {
        return Err(ApiError::NotFound("Post not found".to_string()));
    }

    let result = state.comments.list_top_level(pid, &params).await?;
    let parent_ids: Vec<ObjectId> = result.items.iter().filter_map(|c| c.id).collect();
    let replies = state.comments.replies_for(&parent_ids).await?;

    let mut author_ids: Vec<ObjectId> = result.items.iter().map(|c| c.user_id).collect();
    author_ids.extend(replies.iter().map(|c| c.user_id));
    let authors = state.users.find_many_by_ids(&author_ids).await?;

    let mut items = Vec::with_capacity(result.items.len());
    for comment in result.items {
        let Some(user) = card_for(&authors, comment.user_id) else {
            continue;
        };
        let reply_responses: Vec<CommentResponse> = replies
            .iter()
            .filter(|r| r.parent_id == comment.id)
            .filter_map(|r| {
                let user = card_for(&authors, r.user_id)?;
                Some(to_response(r.clone(), user, auth.user_id, Vec::new()))
            })
            .collect();
        items.push(to_response(comment, user, auth.user_id, reply_responses));
    }

    Ok(Json(serde_json::json!({
        "items": items,
        "total": result.total,
        "page": result.page,
        "per_page": result.per_page,
        "total_pages": result.total_pages,
    })))
}

pub async fn reply(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<CreateReplyRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    body.validate()?;

    let cid = parse_object_id(&id, "comment_id")?;
    let parent = state
        .comments
        .find_by_id(cid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;
    // One level deep only.
    if parent.parent_id.is_some() {
        return Err(ApiError::BadRequest(
            "Replies cannot be nested further".to_string(),
        ));
    }

    let post = state
        .posts
        .find_live(parent.post_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    let comment = state
        .comments
        .create(parent.post_id, auth.user_id, Some(cid), Some(body.text), None)
        .await?;

    let mut warning = None;
    if let Err(e) = state.counters.recompute_comments_count(parent.post_id).await {
        warning = Some(CounterService::degraded("comment", e));
    }

    let viewer = state.users.base.find_by_id(auth.user_id).await?;
    state
        .notifier
        .post_comment(&viewer, post.user_id, parent.post_id)
        .await;

    let response = to_response(comment, UserCard::from_user(&viewer), auth.user_id, Vec::new());
    let mut body = serde_json::json!({ "comment": response });
    if let Some(w) = warning {
        body["counter_warning"] = w.into();
    }
    Ok((StatusCode::CREATED, Json(body)))
}

pub async fn like(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let cid = parse_object_id(&id, "comment_id")?;
    if state.comments.find_by_id(cid).await?.is_none() {
        return Err(ApiError::NotFound("Comment not found".to_string()));
    }

    let (liked, count) = state.comments.toggle_like(cid, auth.user_id).await?;
    Ok(Json(serde_json::json!({
        "liked": liked,
        "likes_count": count,
    })))
}

/// The comment author or the post owner may delete; replies go with it.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let cid = parse_object_id(&id, "comment_id")?;
    let comment = state
        .comments
        .find_by_id(cid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    let post = state.posts.find_live(comment.post_id).await?;
    let allowed = comment.user_id == auth.user_id
        || post.as_ref().map(|p| p.user_id == auth.user_id).unwrap_or(false);
    if !allowed {
        return Err(ApiError::Forbidden("Not your comment".to_string()));
    }

    state.comments.delete_with_replies(cid).await?;

    let mut body = serde_json::json!({ "message": "Comment deleted" });
    if post.is_some() {
        if let Err(e) = state.counters.recompute_comments_count(comment.post_id).await {
            body["counter_warning"] = CounterService::degraded("comment", e).into();
        }
    }
    Ok(Json(body))
}

fn to_response(
    c: Comment,
    user: UserCard,
    viewer: ObjectId,
    replies: Vec<CommentResponse>,
) -> CommentResponse {
    CommentResponse {
        id: c.id.unwrap().to_hex(),
        post_id: c.post_id.to_hex(),
        user,
        parent_id: c.parent_id.map(|p| p.to_hex()),
        text: c.text,
        image: c.image,
        likes_count: c.likes.len() as u32,
        liked_by_viewer: c.likes.contains(&viewer),
        replies,
        created_at: c.created_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}
