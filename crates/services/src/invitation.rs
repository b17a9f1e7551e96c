use std::sync::Arc;

use bson::DateTime;
use hideaway_db::models::Invitation;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::dao::DaoError;
use crate::directory::UserDirectory;
use crate::error::{ServiceError, ServiceResult};
use crate::store::InvitationStore;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const MAX_ISSUE_ATTEMPTS: usize = 10;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    NotFound,
    AlreadyUsed,
    Expired,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CodeValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<InvalidReason>,
}

#[derive(Debug, Clone)]
pub struct Redemption {
    pub created_by: String,
}

/// Single-use invitation codes.
pub struct InvitationLedger {
    invitations: Arc<dyn InvitationStore>,
    directory: Arc<UserDirectory>,
    code_length: usize,
    base_url: String,
}

pub fn generate_code(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

impl InvitationLedger {
    pub fn new(
        invitations: Arc<dyn InvitationStore>,
        directory: Arc<UserDirectory>,
        code_length: usize,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            invitations,
            directory,
            code_length: code_length.max(1),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Link a new guest opens to register with `code`.
    pub fn invite_url(&self, code: &str) -> String {
        format!("{}/register?code={}", self.base_url, code)
    }

    /// Issues a fresh code. A past `expires_at` is stored as given.
    pub async fn issue(&self, actor: &str, expires_at: Option<DateTime>) -> ServiceResult<Invitation> {
        if !self.directory.is_approved(actor).await? {
            return Err(ServiceError::forbidden(
                "Only approved users can issue invitations",
            ));
        }

        for _ in 0..MAX_ISSUE_ATTEMPTS {
            let code = generate_code(self.code_length);
            if self.invitations.find_by_code(&code).await?.is_some() {
                debug!(code, "Invitation code collision, retrying");
                continue;
            }

            let invitation = Invitation {
                id: None,
                code,
                created_by: actor.to_string(),
                used_by: None,
                used_at: None,
                expires_at,
                created_at: DateTime::now(),
            };
            match self.invitations.insert(&invitation).await {
                Ok(stored) => {
                    info!(actor, code = %stored.code, "Invitation issued");
                    return Ok(stored);
                }
                Err(DaoError::DuplicateKey(_)) => {
                    debug!(code = %invitation.code, "Invitation code taken on insert, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ServiceError::Conflict(
            "Could not allocate a unique invitation code".to_string(),
        ))
    }

    pub async fn validate(&self, code: &str) -> ServiceResult<CodeValidation> {
        let reason = match self.invitations.find_by_code(code).await? {
            None => Some(InvalidReason::NotFound),
            Some(inv) if inv.is_used() => Some(InvalidReason::AlreadyUsed),
            Some(inv) if inv.is_expired_at(DateTime::now()) => Some(InvalidReason::Expired),
            Some(_) => None,
        };
        Ok(CodeValidation {
            valid: reason.is_none(),
            reason,
        })
    }

    /// Consumes `code` for `uid`. Only one caller can ever succeed.
    pub async fn redeem(&self, code: &str, uid: &str) -> ServiceResult<Redemption> {
        let invitation = self
            .invitations
            .find_by_code(code)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Invitation".to_string()))?;
        if invitation.is_used() {
            return Err(ServiceError::AlreadyUsed);
        }
        let now = DateTime::now();
        if invitation.is_expired_at(now) {
            return Err(ServiceError::Expired);
        }

        let redeemed = self
            .invitations
            .mark_used(code, uid, now)
            .await?
            .ok_or(ServiceError::AlreadyUsed)?;

        info!(code, uid, created_by = %redeemed.created_by, "Invitation redeemed");
        Ok(Redemption {
            created_by: redeemed.created_by,
        })
    }

    pub async fn list_issued(&self, actor: &str) -> ServiceResult<Vec<Invitation>> {
        self.directory.resolve(actor).await?;
        Ok(self.invitations.list_by_creator(actor).await?)
    }
}
