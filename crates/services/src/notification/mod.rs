//! Outbound push messages and their audit trail.

pub mod line;
pub mod message;

use std::sync::Arc;

use async_trait::async_trait;
use bson::{oid::ObjectId, DateTime};
use hideaway_db::models::{DeliveryStatus, Notification, NotificationType, Reservation};
use tracing::{info, warn};

use crate::error::ServiceResult;
use crate::store::NotificationStore;

pub use line::LinePushSender;

/// Transport that delivers a rendered message to one user.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, user_id: &str, message: &str) -> Result<(), String>;
}

/// Sender used when no push channel is configured.
pub struct DisabledSender;

#[async_trait]
impl NotificationSender for DisabledSender {
    async fn send(&self, _user_id: &str, _message: &str) -> Result<(), String> {
        Err("notifications disabled".to_string())
    }
}

/// Renders, sends and records notifications. Delivery failures are logged
/// and stored, never returned to the caller.
pub struct NotificationDispatcher {
    sender: Arc<dyn NotificationSender>,
    store: Arc<dyn NotificationStore>,
}

impl NotificationDispatcher {
    pub fn new(sender: Arc<dyn NotificationSender>, store: Arc<dyn NotificationStore>) -> Self {
        Self { sender, store }
    }

    pub async fn reservation_event(
        &self,
        kind: NotificationType,
        reservation: &Reservation,
    ) -> DeliveryStatus {
        let text = message::reservation_message(kind, reservation);
        self.dispatch(&reservation.user_id, kind, reservation.id, text)
            .await
    }

    pub async fn invitation_approved(&self, user_id: &str) -> DeliveryStatus {
        self.dispatch(
            user_id,
            NotificationType::InvitationApproved,
            None,
            message::approval_message(),
        )
        .await
    }

    async fn dispatch(
        &self,
        user_id: &str,
        kind: NotificationType,
        reservation_id: Option<ObjectId>,
        text: String,
    ) -> DeliveryStatus {
        let (status, error) = match self.sender.send(user_id, &text).await {
            Ok(()) => {
                info!(user_id, kind = kind.as_str(), "Notification sent");
                (DeliveryStatus::Sent, None)
            }
            Err(e) => {
                warn!(user_id, kind = kind.as_str(), error = %e, "Notification failed");
                (DeliveryStatus::Failed, Some(e))
            }
        };

        let record = Notification {
            id: None,
            user_id: user_id.to_string(),
            notification_type: kind,
            reservation_id,
            message: text,
            sent_at: DateTime::now(),
            status,
            error,
        };
        if let Err(e) = self.store.insert(&record).await {
            warn!(user_id, error = %e, "Failed to record notification");
        }

        status
    }

    pub async fn history(&self, user_id: Option<&str>) -> ServiceResult<Vec<Notification>> {
        Ok(self.store.list(user_id).await?)
    }
}
