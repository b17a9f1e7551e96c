use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::{AuthError, Identity, IdentityGateway};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// HS256 tokens signed with a shared secret. Used for local development
/// and the test suite in place of the chat platform's id tokens.
pub struct JwtIdentityGateway {
    issuer: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtIdentityGateway {
    pub fn new(secret: &str, issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, identity: &Identity, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity.subject_id.clone(),
            name: Some(identity.display_name.clone()),
            picture: Some(identity.picture_url.clone()),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        Ok(token_data.claims)
    }
}

#[async_trait]
impl IdentityGateway for JwtIdentityGateway {
    async fn decode(&self, credential: &str) -> Result<Identity, AuthError> {
        let claims = self.verify_token(credential)?;
        if claims.sub.is_empty() {
            return Err(AuthError::InvalidToken("Missing subject".to_string()));
        }

        Ok(Identity {
            subject_id: claims.sub,
            display_name: claims.name.unwrap_or_else(|| "Unknown".to_string()),
            picture_url: claims.picture.unwrap_or_default(),
        })
    }
}
