use bson::{oid::ObjectId, DateTime};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    /// Display name at booking time. Not kept in sync with the user record.
    pub user_name: String,
    pub date: NaiveDate,
    pub number_of_guests: u32,
    #[serde(default)]
    pub notes: String,
    pub status: ReservationStatus,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub cancelled_at: Option<DateTime>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }
}

impl Reservation {
    pub const COLLECTION: &'static str = "reservations";

    pub fn is_confirmed(&self) -> bool {
        self.status == ReservationStatus::Confirmed
    }
}
