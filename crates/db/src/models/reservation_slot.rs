use bson::DateTime;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Availability of a single calendar date. The date doubles as the
/// document id, so there is at most one slot per day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationSlot {
    #[serde(rename = "_id")]
    pub date: NaiveDate,
    pub available: bool,
    pub reserved_by: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl ReservationSlot {
    pub const COLLECTION: &'static str = "reservation_slots";

    pub fn new(date: NaiveDate, available: bool) -> Self {
        let now = DateTime::now();
        Self {
            date,
            available,
            reserved_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_bookable(&self) -> bool {
        self.available && self.reserved_by.is_none()
    }
}
