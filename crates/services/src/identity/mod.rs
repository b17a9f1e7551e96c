pub mod jwt;
pub mod line;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use jwt::JwtIdentityGateway;
pub use line::LineIdentityGateway;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Identity provider unreachable: {0}")]
    Provider(String),
}

/// Who a bearer credential belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub subject_id: String,
    pub display_name: String,
    pub picture_url: String,
}

#[async_trait]
pub trait IdentityGateway: Send + Sync {
    async fn decode(&self, credential: &str) -> Result<Identity, AuthError>;
}
