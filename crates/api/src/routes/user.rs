use axum::{
    Json,
    extract::{Path, State},
};
use backbook_db::models::{User, UserDetails};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{UserCard, card_for, parse_object_id};
use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDetailsRequest {
    #[validate(length(max = 100, message = "Bio must be at most 100 characters"))]
    pub bio: Option<String>,
    pub other_name: Option<String>,
    pub job: Option<String>,
    pub workplace: Option<String>,
    pub high_school: Option<String>,
    pub college: Option<String>,
    pub current_city: Option<String>,
    pub hometown: Option<String>,
    pub relationship: Option<String>,
    pub instagram: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PushSubscriptionRequest {
    /// The PushSubscription document from the browser, verbatim.
    pub subscription: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub picture: String,
    pub cover: Option<String>,
    pub gender: String,
    pub details: UserDetails,
    pub friends_count: u32,
    pub followers_count: u32,
    pub following_count: u32,
    pub created_at: String,
}

/// Profile page payload: the user, where the viewer stands with them, and
/// a preview of their friends.
pub async fn profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(username): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state
        .users
        .find_by_username(&username)
        .await
        .map_err(|_| ApiError::NotFound("User not found".to_string()))?;
    let user_id = user
        .id
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let relationship = state
        .social
        .relationship_view(auth.user_id, user_id)
        .await?;

    let accepted = state.requests.accepted_for(user_id).await?;
    let preview_ids: Vec<_> = accepted
        .iter()
        .take(9)
        .map(|r| r.counterpart(user_id))
        .collect();
    let preview_users = state.users.find_many_by_ids(&preview_ids).await?;
    let friends: Vec<UserCard> = preview_ids
        .iter()
        .filter_map(|id| card_for(&preview_users, *id))
        .collect();

    Ok(Json(serde_json::json!({
        "user": to_profile_response(user),
        "relationship": relationship,
        "friends": friends,
    })))
}

pub async fn update_details(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<UpdateDetailsRequest>,
) -> Result<Json<UserDetails>, ApiError> {
    body.validate()?;

    let details = UserDetails {
        bio: body.bio,
        other_name: body.other_name,
        job: body.job,
        workplace: body.workplace,
        high_school: body.high_school,
        college: body.college,
        current_city: body.current_city,
        hometown: body.hometown,
        relationship: body.relationship,
        instagram: body.instagram,
    };
    state.users.update_details(auth.user_id, &details).await?;

    Ok(Json(details))
}

pub async fn search(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(term): Path<String>,
) -> Result<Json<Vec<UserCard>>, ApiError> {
    if term.trim().is_empty() {
        return Ok(Json(Vec::new()));
    }
    let users = state.users.search(term.trim()).await?;
    Ok(Json(users.iter().map(UserCard::from_user).collect()))
}

pub async fn add_search_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let target = parse_object_id(&user_id, "user_id")?;
    if !state.users.exists(target).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    state.users.add_search_history(auth.user_id, target).await?;
    Ok(Json(serde_json::json!({ "message": "Search saved" })))
}

pub async fn remove_search_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let target = parse_object_id(&user_id, "user_id")?;
    state
        .users
        .remove_search_history(auth.user_id, target)
        .await?;
    Ok(Json(serde_json::json!({ "message": "Search removed" })))
}

pub async fn list_search_history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<UserCard>>, ApiError> {
    let users = state.users.search_history_users(auth.user_id).await?;
    Ok(Json(users.iter().map(UserCard::from_user).collect()))
}

pub async fn set_push_subscription(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<PushSubscriptionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let subscription = body.subscription.to_string();
    state
        .users
        .set_push_subscription(auth.user_id, &subscription)
        .await?;
    Ok(Json(serde_json::json!({ "message": "Push subscription saved" })))
}

fn to_profile_response(u: User) -> ProfileResponse {
    ProfileResponse {
        id: u.id.unwrap().to_hex(),
        first_name: u.first_name,
        last_name: u.last_name,
        username: u.username,
        picture: u.picture,
        cover: u.cover,
        gender: u.gender,
        details: u.details,
        friends_count: u.friends_count,
        followers_count: u.followers_count,
        following_count: u.following_count,
        created_at: u.created_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}
