use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Audit record of one outbound push message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub notification_type: NotificationType,
    pub reservation_id: Option<ObjectId>,
    pub message: String,
    pub sent_at: DateTime,
    pub status: DeliveryStatus,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    ReservationConfirmed,
    ReservationReminder,
    ReservationCancelled,
    ReservationUpdated,
    InvitationApproved,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::ReservationConfirmed => "reservation_confirmed",
            NotificationType::ReservationReminder => "reservation_reminder",
            NotificationType::ReservationCancelled => "reservation_cancelled",
            NotificationType::ReservationUpdated => "reservation_updated",
            NotificationType::InvitationApproved => "invitation_approved",
        }
    }
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Failed => "failed",
        }
    }
}

impl Notification {
    pub const COLLECTION: &'static str = "notifications";
}
