use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bson::DateTime;
use hideaway_db::models::Invitation;
use hideaway_services::invitation::CodeValidation;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, json::ValidJson},
    state::AppState,
};

#[derive(Debug, Default, Deserialize, Validate)]
pub struct IssueInvitationRequest {
    /// RFC 3339 timestamp; omitted means the code never expires.
    pub expires_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    pub id: String,
    pub code: String,
    pub url: String,
    pub created_by: String,
    pub used_by: Option<String>,
    pub used_at: Option<String>,
    pub expires_at: Option<String>,
    pub created_at: String,
}

fn to_response(state: &AppState, i: Invitation) -> InvitationResponse {
    InvitationResponse {
        id: i.id.map(|id| id.to_hex()).unwrap_or_default(),
        url: state.invitations.invite_url(&i.code),
        code: i.code,
        created_by: i.created_by,
        used_by: i.used_by,
        used_at: i.used_at.and_then(|d| d.try_to_rfc3339_string().ok()),
        expires_at: i.expires_at.and_then(|d| d.try_to_rfc3339_string().ok()),
        created_at: i.created_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}

pub async fn issue(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(body): ValidJson<IssueInvitationRequest>,
) -> Result<(StatusCode, Json<InvitationResponse>), ApiError> {
    let expires_at = body
        .expires_at
        .as_deref()
        .map(|s| DateTime::parse_rfc3339_str(s))
        .transpose()
        .map_err(|_| ApiError::BadRequest("expires_at must be an RFC 3339 timestamp".to_string()))?;

    let invitation = state.invitations.issue(&auth.uid, expires_at).await?;

    Ok((StatusCode::CREATED, Json(to_response(&state, invitation))))
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<InvitationResponse>>, ApiError> {
    let invitations = state.invitations.list_issued(&auth.uid).await?;
    let response = invitations
        .into_iter()
        .map(|i| to_response(&state, i))
        .collect();
    Ok(Json(response))
}

/// Public: tells a prospective guest whether their code still works.
pub async fn validate(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<CodeValidation>, ApiError> {
    Ok(Json(state.invitations.validate(code.trim()).await?))
}
