use axum::{
    Json,
    extract::{Path, State},
};
use backbook_services::SocialOutcome;
use serde::Serialize;

use super::{UserCard, card_for, parse_object_id};
use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Serialize)]
pub struct RequestEntry {
    pub id: String,
    pub user: UserCard,
}

pub async fn add(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let target = parse_object_id(&user_id, "user_id")?;
    let outcome = state
        .social
        .add_friend(&state.notifier, auth.user_id, target)
        .await?;
    Ok(Json(outcome_json(outcome)))
}

pub async fn accept(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let request_id = parse_object_id(&request_id, "request_id")?;
    let outcome = state
        .social
        .accept_request(&state.notifier, auth.user_id, request_id)
        .await?;
    Ok(Json(outcome_json(outcome)))
}

pub async fn cancel(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let request_id = parse_object_id(&request_id, "request_id")?;
    let outcome = state.social.cancel_request(auth.user_id, request_id).await?;
    Ok(Json(outcome_json(outcome)))
}

pub async fn unfriend(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let request_id = parse_object_id(&request_id, "request_id")?;
    let outcome = state.social.remove_friend(auth.user_id, request_id).await?;
    Ok(Json(outcome_json(outcome)))
}

pub async fn follow(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let target = parse_object_id(&user_id, "user_id")?;
    let outcome = state
        .social
        .follow(&state.notifier, auth.user_id, target)
        .await?;
    Ok(Json(outcome_json(outcome)))
}

pub async fn unfollow(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let target = parse_object_id(&user_id, "user_id")?;
    let outcome = state.social.unfollow(auth.user_id, target).await?;
    Ok(Json(outcome_json(outcome)))
}

/// Accepted friends plus both directions of pending requests, ready for
/// the friends page.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let accepted = state.requests.accepted_for(auth.user_id).await?;
    let friend_ids: Vec<_> = accepted
        .iter()
        .map(|r| r.counterpart(auth.user_id))
        .collect();
    let friend_users = state.users.find_many_by_ids(&friend_ids).await?;
    let friends: Vec<UserCard> = friend_ids
        .iter()
        .filter_map(|id| card_for(&friend_users, *id))
        .collect();

    let sent = state.requests.pending_sent_by(auth.user_id).await?;
    let sent_ids: Vec<_> = sent.iter().map(|r| r.recipient).collect();
    let sent_users = state.users.find_many_by_ids(&sent_ids).await?;
    let sent_requests: Vec<RequestEntry> = sent
        .iter()
        .filter_map(|r| {
            Some(RequestEntry {
                id: r.id?.to_hex(),
                user: card_for(&sent_users, r.recipient)?,
            })
        })
        .collect();

    let received = state.requests.pending_received_for(auth.user_id).await?;
    let received_ids: Vec<_> = received.iter().map(|r| r.sender).collect();
    let received_users = state.users.find_many_by_ids(&received_ids).await?;
    let received_requests: Vec<RequestEntry> = received
        .iter()
        .filter_map(|r| {
            Some(RequestEntry {
                id: r.id?.to_hex(),
                user: card_for(&received_users, r.sender)?,
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "friends": friends,
        "sent_requests": sent_requests,
        "received_requests": received_requests,
    })))
}

fn outcome_json(outcome: SocialOutcome) -> serde_json::Value {
    let mut body = serde_json::json!({
        "message": outcome.message,
        "relationship": outcome.relationship,
    });
    if let Some(warning) = outcome.counter_warning {
        body["counter_warning"] = serde_json::Value::String(warning);
    }
    body
}
