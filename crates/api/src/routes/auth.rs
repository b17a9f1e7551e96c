use axum::{Json, extract::State, http::StatusCode};
use hideaway_db::models::User;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, json::ValidJson},
    state::AppState,
};

#[derive(Debug, Default, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(max = 32))]
    pub invitation_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub display_name: String,
    pub picture_url: String,
    pub role: String,
    pub status: String,
    pub invited_by: Option<String>,
    pub invited_at: String,
    pub approved_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: String,
    pub display_name: String,
    pub picture_url: String,
    pub role: String,
    pub status: String,
}

pub(crate) fn to_user_response(u: User) -> UserResponse {
    UserResponse {
        id: u.id,
        display_name: u.display_name,
        picture_url: u.picture_url,
        role: u.role.as_str().to_string(),
        status: u.status.as_str().to_string(),
        invited_by: u.invited_by,
        invited_at: u.invited_at.try_to_rfc3339_string().unwrap_or_default(),
        approved_at: u
            .approved_at
            .and_then(|d| d.try_to_rfc3339_string().ok()),
        created_at: u.created_at.try_to_rfc3339_string().unwrap_or_default(),
        updated_at: u.updated_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}

/// Registered, non-blocked user behind the credential.
async fn active_user(state: &AppState, auth: &AuthUser) -> Result<User, ApiError> {
    let user = state.users.resolve(&auth.uid).await?;
    if user.is_blocked() {
        return Err(ApiError::Forbidden("Access is not permitted".to_string()));
    }
    Ok(user)
}

pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = active_user(&state, &auth).await?;
    Ok(Json(to_user_response(user)))
}

pub async fn login(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = active_user(&state, &auth).await?;
    Ok(Json(LoginResponse {
        id: user.id,
        display_name: user.display_name,
        picture_url: user.picture_url,
        role: user.role.as_str().to_string(),
        status: user.status.as_str().to_string(),
    }))
}

pub async fn register(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(body): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state
        .users
        .register(
            &auth.identity,
            body.invitation_code.as_deref(),
            &state.invitations,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(to_user_response(user))))
}
