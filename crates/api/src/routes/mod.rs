pub mod admin;
pub mod auth;
pub mod invitation;
pub mod reservation;
pub mod slot;

use chrono::NaiveDate;
use hideaway_db::models::{ReservationStatus, UserStatus};
use hideaway_services::store::DateRange;

use crate::error::ApiError;

pub(crate) fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("{field} must be a YYYY-MM-DD date")))
}

pub(crate) fn parse_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<DateRange, ApiError> {
    let start = start.map(|s| parse_date("start_date", s)).transpose()?;
    let end = end.map(|e| parse_date("end_date", e)).transpose()?;
    Ok(DateRange::new(start, end))
}

pub(crate) fn parse_reservation_status(
    value: Option<&str>,
) -> Result<Option<ReservationStatus>, ApiError> {
    match value {
        None => Ok(None),
        Some("confirmed") => Ok(Some(ReservationStatus::Confirmed)),
        Some("cancelled") => Ok(Some(ReservationStatus::Cancelled)),
        Some(other) => Err(ApiError::BadRequest(format!(
            "Unknown reservation status: {other}"
        ))),
    }
}

pub(crate) fn parse_user_status(value: &str) -> Result<UserStatus, ApiError> {
    match value {
        "pending" => Ok(UserStatus::Pending),
        "approved" => Ok(UserStatus::Approved),
        "blocked" => Ok(UserStatus::Blocked),
        other => Err(ApiError::BadRequest(format!("Unknown user status: {other}"))),
    }
}
