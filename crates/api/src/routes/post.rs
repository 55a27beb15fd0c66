use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use backbook_db::models::{Post, PostKind, ReactionKind, ReactionStats};
use backbook_services::CounterService;
use backbook_services::dao::base::PaginationParams;
use bson::{doc, oid::ObjectId};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{UserCard, card_for, parse_object_id};
use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub kind: PostKind,
    #[validate(length(min = 1, max = 300, message = "Post text must be 1-300 characters"))]
    pub text: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub background: Option<String>,
    pub shared_post_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReactRequest {
    pub reaction: ReactionKind,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: String,
    pub user: UserCard,
    pub kind: String,
    pub text: Option<String>,
    pub images: Vec<String>,
    pub background: Option<String>,
    pub shared_post_id: Option<String>,
    pub reactions: ReactionStats,
    pub comments_count: u32,
    pub shares_count: u32,
    pub viewer_reaction: Option<String>,
    pub created_at: String,
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    body.validate()?;

    let shared_post_id = body
        .shared_post_id
        .as_deref()
        .map(|s| parse_object_id(s, "shared_post_id"))
        .transpose()?;

    match body.kind {
        PostKind::Normal if body.text.is_none() && body.images.is_empty() => {
            return Err(ApiError::BadRequest(
                "A post needs text or images".to_string(),
            ));
        }
        PostKind::Share if shared_post_id.is_none() => {
            return Err(ApiError::BadRequest(
                "shared_post_id is required for share posts".to_string(),
            ));
        }
        _ => {}
    }

    if let Some(source_id) = shared_post_id {
        if state.posts.find_live(source_id).await?.is_none() {
            return Err(ApiError::NotFound("Shared post not found".to_string()));
        }
    }

    let post = state
        .posts
        .create(
            auth.user_id,
            body.kind,
            body.text,
            body.images,
            body.background,
            shared_post_id,
        )
        .await?;

    let mut warning = None;
    if let Some(source_id) = shared_post_id {
        if let Err(e) = state.counters.recompute_shares_count(source_id).await {
            warning = Some(CounterService::degraded("share", e));
        }
    }

    let author = state.users.base.find_by_id(auth.user_id).await?;
    let response = to_response(post, UserCard::from_user(&author), None);

    let mut body = serde_json::json!({ "post": response });
    if let Some(w) = warning {
        body["counter_warning"] = w.into();
    }
    Ok((StatusCode::CREATED, Json(body)))
}

/// The viewer's timeline: their own posts plus posts from everyone they
/// follow.
pub async fn feed(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut author_ids = state.follows.following_ids(auth.user_id).await?;
    author_ids.push(auth.user_id);

    let result = state.posts.feed(author_ids, &params).await?;
    let items = annotate(&state, auth.user_id, result.items).await?;

    Ok(Json(serde_json::json!({
        "items": items,
        "total": result.total,
        "page": result.page,
        "per_page": result.per_page,
        "total_pages": result.total_pages,
    })))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<PostResponse>, ApiError> {
    let pid = parse_object_id(&id, "post_id")?;
    let post = state
        .posts
        .find_live(pid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    let mut items = annotate(&state, auth.user_id, vec![post]).await?;
    items
        .pop()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))
}

pub async fn by_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(username): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state
        .users
        .find_by_username(&username)
        .await
        .map_err(|_| ApiError::NotFound("User not found".to_string()))?;

    let user_id = user
        .id
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    let result = state.posts.by_user(user_id, &params).await?;
    let items = annotate(&state, auth.user_id, result.items).await?;

    Ok(Json(serde_json::json!({
        "items": items,
        "total": result.total,
        "page": result.page,
        "per_page": result.per_page,
        "total_pages": result.total_pages,
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let pid = parse_object_id(&id, "post_id")?;
    let post = state
        .posts
        .find_live(pid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;
    if post.user_id != auth.user_id {
        return Err(ApiError::Forbidden("Not your post".to_string()));
    }

    state.posts.soft_delete(pid, auth.user_id).await?;

    let mut body = serde_json::json!({ "message": "Post deleted" });
    // A deleted share no longer counts toward its source.
    if post.kind == PostKind::Share {
        if let Some(source_id) = post.shared_post_id {
            if let Err(e) = state.counters.recompute_shares_count(source_id).await {
                body["counter_warning"] = CounterService::degraded("share", e).into();
            }
        }
    }
    Ok(Json(body))
}

pub async fn react(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<ReactRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let pid = parse_object_id(&id, "post_id")?;
    let post = state
        .posts
        .find_live(pid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    let now = state
        .reactions
        .toggle(pid, auth.user_id, body.reaction)
        .await?;

    let mut warning = None;
    let stats = match state.counters.recompute_reaction_stats(pid).await {
        Ok(stats) => stats,
        Err(e) => {
            warning = Some(CounterService::degraded("reaction", e));
            // Stale until the next recompute touches this post.
            post.reactions.clone()
        }
    };

    if now.is_some() {
        let viewer = state.users.base.find_by_id(auth.user_id).await?;
        state.notifier.post_react(&viewer, post.user_id, pid).await;
    }

    let mut body = serde_json::json!({
        "message": if now.is_some() { "Reaction saved" } else { "Reaction removed" },
        "reactions": stats,
        "viewer_reaction": now.map(|k| k.as_str()),
    });
    if let Some(w) = warning {
        body["counter_warning"] = w.into();
    }
    Ok(Json(body))
}

pub async fn reacts(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let pid = parse_object_id(&id, "post_id")?;
    let post = state
        .posts
        .find_live(pid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    let own = state.reactions.find_user_reaction(pid, auth.user_id).await?;

    Ok(Json(serde_json::json!({
        "reactions": post.reactions,
        "viewer_reaction": own.map(|r| r.reaction.as_str()),
    })))
}

pub async fn toggle_save(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let pid = parse_object_id(&id, "post_id")?;
    if state.posts.find_live(pid).await?.is_none() {
        return Err(ApiError::NotFound("Post not found".to_string()));
    }

    let saved = state.users.toggle_saved_post(auth.user_id, pid).await?;
    Ok(Json(serde_json::json!({
        "message": if saved { "Post saved" } else { "Post unsaved" },
        "saved": saved,
    })))
}

pub async fn saved(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let user = state.users.base.find_by_id(auth.user_id).await?;
    let mut entries = user.saved_posts;
    entries.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));

    let ids: Vec<ObjectId> = entries.iter().map(|e| e.post_id).collect();
    if ids.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let posts = state
        .posts
        .base
        .find_many(
            doc! { "_id": { "$in": ids.clone() }, "deleted": false },
            None,
        )
        .await?;
    // Preserve newest-saved-first order from the entries.
    let ordered: Vec<Post> = ids
        .iter()
        .filter_map(|id| posts.iter().find(|p| p.id == Some(*id)).cloned())
        .collect();

    let items = annotate(&state, auth.user_id, ordered).await?;
    Ok(Json(items))
}

/// Joins author cards and the viewer's own reactions onto a page of posts.
async fn annotate(
    state: &AppState,
    viewer: ObjectId,
    posts: Vec<Post>,
) -> Result<Vec<PostResponse>, ApiError> {
    let author_ids: Vec<ObjectId> = posts.iter().map(|p| p.user_id).collect();
    let authors = state.users.find_many_by_ids(&author_ids).await?;

    let post_ids: Vec<ObjectId> = posts.iter().filter_map(|p| p.id).collect();
    let reactions = state
        .reactions
        .find_user_reactions(viewer, &post_ids)
        .await?;

    let mut items = Vec::with_capacity(posts.len());
    for post in posts {
        let Some(user) = card_for(&authors, post.user_id) else {
            continue;
        };
        let viewer_reaction = post.id.and_then(|pid| {
            reactions
                .iter()
                .find(|r| r.post_id == pid)
                .map(|r| r.reaction)
        });
        items.push(to_response(post, user, viewer_reaction));
    }
    Ok(items)
}

fn to_response(p: Post, user: UserCard, viewer_reaction: Option<ReactionKind>) -> PostResponse {
    PostResponse {
        id: p.id.unwrap().to_hex(),
        user,
        kind: p.kind.as_str().to_string(),
        text: p.text,
        images: p.images,
        background: p.background,
        shared_post_id: p.shared_post_id.map(|id| id.to_hex()),
        reactions: p.reactions,
        comments_count: p.comments_count,
        shares_count: p.shares_count,
        viewer_reaction: viewer_reaction.map(|k| k.as_str().to_string()),
        created_at: p.created_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}
