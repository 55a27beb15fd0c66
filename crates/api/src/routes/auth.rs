use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
};
use backbook_db::models::{User, UserDetails};
use backbook_services::auth::TokenPair;
use bson::doc;
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 25, message = "First name must be 3-25 characters"))]
    pub first_name: String,
    #[validate(length(min = 3, max = 25, message = "Last name must be 3-25 characters"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub gender: String,
    pub birth_year: i32,
    pub birth_month: u32,
    pub birth_day: u32,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidateResetCodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    pub reset_token: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user: MeResponse,
}

/// The authenticated user's own document, secrets stripped.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub picture: String,
    pub cover: Option<String>,
    pub gender: String,
    pub birth_year: i32,
    pub birth_month: u32,
    pub birth_day: u32,
    pub verified: bool,
    pub details: UserDetails,
    pub friends_count: u32,
    pub followers_count: u32,
    pub following_count: u32,
    pub unseen_messages: u32,
    pub unseen_notifications: u32,
    pub created_at: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AuthResponse>), ApiError> {
    body.validate()?;
    if NaiveDate::from_ymd_opt(body.birth_year, body.birth_month, body.birth_day).is_none() {
        return Err(ApiError::BadRequest("Invalid birth date".to_string()));
    }

    if state
        .users
        .base
        .find_one(doc! { "email": &body.email })
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let username = state
        .users
        .generate_username(&body.first_name, &body.last_name)
        .await?;
    let password_hash = state.auth.hash_password(&body.password)?;

    let code = state.auth.generate_code();
    let code_hash = state.auth.hash_code(&code);

    let user = state
        .users
        .create(
            body.first_name,
            body.last_name,
            username,
            body.email,
            password_hash,
            body.gender,
            (body.birth_year, body.birth_month, body.birth_day),
            Some(code_hash),
        )
        .await
        .map_err(|e| match e {
            backbook_services::dao::DaoError::DuplicateKey(_) => {
                ApiError::Conflict("Email already registered".to_string())
            }
            other => other.into(),
        })?;

    let user_id = user
        .id
        .ok_or_else(|| ApiError::Internal("User vanished after creation".to_string()))?;
    // Mail delivery is out of scope; the code is stored hashed and the
    // hand-off is only logged.
    info!(email = %user.email, "Verification code issued");

    let tokens = state
        .auth
        .generate_tokens(user_id, &user.email, &user.username)?;
    let headers = auth_cookies(&state, &tokens);

    let response = AuthResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
        user: to_me_response(user),
    };

    Ok((StatusCode::CREATED, headers, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    // One uniform rejection for unknown email and wrong password.
    let user = state
        .users
        .find_by_email(&body.email)
        .await
        .map_err(|_| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let password_hash = user
        .password_hash
        .as_ref()
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = state.auth.verify_password(&body.password, password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let user_id = user
        .id
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;
    let tokens = state
        .auth
        .generate_tokens(user_id, &user.email, &user.username)?;
    let headers = auth_cookies(&state, &tokens);

    let response = AuthResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
        user: to_me_response(user),
    };

    Ok((headers, Json(response)))
}

pub async fn logout() -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    let access = "access_token=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0";
    let refresh = "refresh_token=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0";
    headers.insert(header::SET_COOKIE, access.parse().unwrap());
    headers.append(header::SET_COOKIE, refresh.parse().unwrap());
    Ok(headers)
}

pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<MeResponse>, ApiError> {
    let user = state.users.base.find_by_id(auth.user_id).await?;
    Ok(Json(to_me_response(user)))
}

pub async fn ping(_auth: AuthUser) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn verify_email(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<VerifyEmailRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state.users.base.find_by_id(auth.user_id).await?;
    if user.verified {
        return Err(ApiError::BadRequest("Email is already verified".to_string()));
    }

    let stored = user
        .verification_code_hash
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("No verification code issued".to_string()))?;
    if state.auth.hash_code(&body.code) != stored {
        return Err(ApiError::BadRequest("Invalid verification code".to_string()));
    }

    state.users.mark_verified(auth.user_id).await?;
    Ok(Json(serde_json::json!({ "message": "Email verified" })))
}

pub async fn resend_verification(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state.users.base.find_by_id(auth.user_id).await?;
    if user.verified {
        return Err(ApiError::BadRequest("Email is already verified".to_string()));
    }

    let code = state.auth.generate_code();
    let code_hash = state.auth.hash_code(&code);
    state
        .users
        .set_verification_code(auth.user_id, &code_hash)
        .await?;
    info!(email = %user.email, "Verification code reissued");

    Ok(Json(serde_json::json!({ "message": "Verification code sent" })))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    body.validate()?;

    // Always 200, so the endpoint does not reveal which emails exist.
    if let Ok(user) = state.users.find_by_email(&body.email).await {
        if let Some(user_id) = user.id {
            let code = state.auth.generate_code();
            let code_hash = state.auth.hash_code(&code);
            let expires_at = bson::DateTime::from_chrono(Utc::now() + Duration::minutes(10));
            state
                .users
                .set_reset_code(user_id, &code_hash, expires_at)
                .await?;
            info!(email = %user.email, "Password reset code issued");
        }
    }

    Ok(Json(serde_json::json!({
        "message": "If the email exists, a reset code has been sent"
    })))
}

pub async fn validate_reset_code(
    State(state): State<AppState>,
    Json(body): Json<ValidateResetCodeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state
        .users
        .find_by_email(&body.email)
        .await
        .map_err(|_| ApiError::BadRequest("Invalid reset code".to_string()))?;

    let stored = user
        .reset_code_hash
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Invalid reset code".to_string()))?;
    if state.auth.hash_code(&body.code) != stored {
        return Err(ApiError::BadRequest("Invalid reset code".to_string()));
    }

    let expired = user
        .reset_code_expires_at
        .map(|e| e.to_chrono() < Utc::now())
        .unwrap_or(true);
    if expired {
        return Err(ApiError::BadRequest("Reset code expired".to_string()));
    }

    let user_id = user
        .id
        .ok_or_else(|| ApiError::BadRequest("Invalid reset code".to_string()))?;
    let token = state
        .auth
        .generate_reset_token(user_id, &user.email, &user.username)?;
    Ok(Json(serde_json::json!({ "reset_token": token })))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    body.validate()?;

    let claims = state.auth.verify_reset_token(&body.reset_token)?;
    let user_id = bson::oid::ObjectId::parse_str(&claims.sub)
        .map_err(|_| ApiError::Unauthorized("Invalid user ID".to_string()))?;

    let password_hash = state.auth.hash_password(&body.password)?;
    state.users.update_password(user_id, &password_hash).await?;

    Ok(Json(serde_json::json!({ "message": "Password updated" })))
}

fn auth_cookies(state: &AppState, tokens: &TokenPair) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let access = format!(
        "access_token={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        tokens.access_token, tokens.expires_in
    );
    headers.insert(header::SET_COOKIE, access.parse().unwrap());
    let refresh = format!(
        "refresh_token={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        tokens.refresh_token, state.settings.jwt.refresh_token_ttl_secs
    );
    headers.append(header::SET_COOKIE, refresh.parse().unwrap());
    headers
}

fn to_me_response(u: User) -> MeResponse {
    MeResponse {
        id: u.id.unwrap().to_hex(),
        first_name: u.first_name,
        last_name: u.last_name,
        username: u.username,
        email: u.email,
        picture: u.picture,
        cover: u.cover,
        gender: u.gender,
        birth_year: u.birth_year,
        birth_month: u.birth_month,
        birth_day: u.birth_day,
        verified: u.verified,
        details: u.details,
        friends_count: u.friends_count,
        followers_count: u.followers_count,
        following_count: u.following_count,
        unseen_messages: u.unseen_messages,
        unseen_notifications: u.unseen_notifications,
        created_at: u.created_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}
