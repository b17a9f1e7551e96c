use async_trait::async_trait;
use serde::Deserialize;

use super::{AuthError, Identity, IdentityGateway};

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerifyError {
    #[serde(default)]
    error_description: Option<String>,
}

/// Verifies LINE Login id tokens against the platform's verify endpoint.
pub struct LineIdentityGateway {
    client: reqwest::Client,
    verify_url: String,
    channel_id: String,
}

impl LineIdentityGateway {
    pub fn new(verify_url: String, channel_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            verify_url,
            channel_id,
        }
    }
}

#[async_trait]
impl IdentityGateway for LineIdentityGateway {
    async fn decode(&self, credential: &str) -> Result<Identity, AuthError> {
        let resp = self
            .client
            .post(&self.verify_url)
            .form(&[("id_token", credential), ("client_id", self.channel_id.as_str())])
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if !resp.status().is_success() {
            let reason = resp
                .json::<VerifyError>()
                .await
                .ok()
                .and_then(|e| e.error_description)
                .unwrap_or_else(|| "Token rejected".to_string());
            if reason.to_ascii_lowercase().contains("expired") {
                return Err(AuthError::TokenExpired);
            }
            return Err(AuthError::InvalidToken(reason));
        }

        let verified = resp
            .json::<VerifyResponse>()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if verified.sub.is_empty() {
            return Err(AuthError::InvalidToken("Missing subject".to_string()));
        }

        Ok(Identity {
            subject_id: verified.sub,
            display_name: verified.name.unwrap_or_else(|| "Unknown".to_string()),
            picture_url: verified.picture.unwrap_or_default(),
        })
    }
}
