use std::sync::Arc;

use bson::DateTime;
use hideaway_db::models::{Role, User, UserStatus};
use tracing::info;

use crate::dao::DaoError;
use crate::error::{ServiceError, ServiceResult};
use crate::identity::Identity;
use crate::invitation::InvitationLedger;
use crate::notification::NotificationDispatcher;
use crate::store::UserStore;

/// User records and the role/status checks every other service relies on.
pub struct UserDirectory {
    users: Arc<dyn UserStore>,
    notifier: Arc<NotificationDispatcher>,
    owner_subject_id: String,
}

impl UserDirectory {
    pub fn new(
        users: Arc<dyn UserStore>,
        notifier: Arc<NotificationDispatcher>,
        owner_subject_id: impl Into<String>,
    ) -> Self {
        Self {
            users,
            notifier,
            owner_subject_id: owner_subject_id.into(),
        }
    }

    pub async fn resolve(&self, uid: &str) -> ServiceResult<User> {
        self.users
            .find(uid)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User".to_string()))
    }

    pub async fn is_owner(&self, uid: &str) -> ServiceResult<bool> {
        Ok(self.users.find(uid).await?.is_some_and(|u| u.is_owner()))
    }

    pub async fn is_approved(&self, uid: &str) -> ServiceResult<bool> {
        Ok(self.users.find(uid).await?.is_some_and(|u| u.is_approved()))
    }

    /// Loads the actor and fails with `Forbidden` unless it is the owner.
    pub async fn require_owner(&self, uid: &str) -> ServiceResult<User> {
        match self.users.find(uid).await? {
            Some(user) if user.is_owner() => Ok(user),
            _ => Err(ServiceError::forbidden("Owner only")),
        }
    }

    fn is_bootstrap_owner(&self, uid: &str) -> bool {
        !self.owner_subject_id.is_empty() && self.owner_subject_id == uid
    }

    /// Creates the user record for a first-time subject. The configured
    /// owner identity is admitted directly; everyone else starts pending,
    /// and a supplied invitation code must redeem.
    pub async fn register(
        &self,
        identity: &Identity,
        invitation_code: Option<&str>,
        ledger: &InvitationLedger,
    ) -> ServiceResult<User> {
        let uid = identity.subject_id.as_str();
        if self.users.find(uid).await?.is_some() {
            return Err(ServiceError::AlreadyExists("User".to_string()));
        }

        let now = DateTime::now();
        let mut user = User {
            id: uid.to_string(),
            display_name: identity.display_name.clone(),
            picture_url: identity.picture_url.clone(),
            role: Role::User,
            status: UserStatus::Pending,
            invited_by: None,
            invited_at: now,
            approved_at: None,
            created_at: now,
            updated_at: now,
        };

        if self.is_bootstrap_owner(uid) {
            user.role = Role::Owner;
            user.status = UserStatus::Approved;
            user.approved_at = Some(now);
        } else if let Some(code) = invitation_code.map(str::trim).filter(|c| !c.is_empty()) {
            // Redeemed before the insert; a failed insert leaves the code spent.
            let redemption = ledger.redeem(code, uid).await?;
            user.invited_by = Some(redemption.created_by);
        }

        self.users.insert(&user).await.map_err(|e| match e {
            DaoError::DuplicateKey(_) => ServiceError::AlreadyExists("User".to_string()),
            other => other.into(),
        })?;

        info!(
            uid,
            role = user.role.as_str(),
            status = user.status.as_str(),
            invited_by = user.invited_by.as_deref(),
            "User registered"
        );
        Ok(user)
    }

    pub async fn set_status(
        &self,
        actor: &str,
        target: &str,
        status: UserStatus,
    ) -> ServiceResult<User> {
        self.require_owner(actor).await?;

        let current = self.resolve(target).await?;
        if current.is_owner() {
            return Err(ServiceError::invalid_operation(
                "The owner's status cannot be changed",
            ));
        }
        if status == UserStatus::Pending {
            return Err(ServiceError::invalid_input(
                "Status must be approved or blocked",
            ));
        }

        let approved_at = (status == UserStatus::Approved && current.approved_at.is_none())
            .then(DateTime::now);
        let updated = self
            .users
            .update_status(target, status, approved_at)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User".to_string()))?;

        info!(
            actor,
            target,
            from = current.status.as_str(),
            to = status.as_str(),
            "User status changed"
        );

        if current.status == UserStatus::Pending && status == UserStatus::Approved {
            self.notifier.invitation_approved(target).await;
        }

        Ok(updated)
    }

    pub async fn list(&self, actor: &str, status: Option<UserStatus>) -> ServiceResult<Vec<User>> {
        self.require_owner(actor).await?;
        Ok(self.users.list(status).await?)
    }
}
