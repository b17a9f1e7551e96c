use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use hideaway_services::identity::Identity;

use crate::{error::ApiError, state::AppState};

/// The verified identity behind the request's bearer credential. Says
/// nothing about whether the subject is registered.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
    pub identity: Identity,
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;

        let identity = app_state.identity.decode(token).await?;

        Ok(AuthUser {
            uid: identity.subject_id.clone(),
            identity,
        })
    }
}

/// Helper trait for extracting AppState from composite state types
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

impl FromRef<AppState> for AppState {
    fn from_ref(input: &AppState) -> Self {
        input.clone()
    }
}
