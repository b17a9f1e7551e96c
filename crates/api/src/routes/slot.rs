use axum::{
    Json,
    extract::{Query, State},
};
use hideaway_db::models::ReservationSlot;
use serde::{Deserialize, Serialize};

use super::parse_range;
use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SlotResponse {
    pub date: String,
    pub available: bool,
    pub reserved: bool,
}

#[derive(Debug, Serialize)]
pub struct AdminSlotResponse {
    pub date: String,
    pub available: bool,
    pub reserved_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub(crate) fn to_admin_response(s: ReservationSlot) -> AdminSlotResponse {
    AdminSlotResponse {
        date: s.date.to_string(),
        available: s.available,
        reserved_by: s.reserved_by,
        created_at: s.created_at.try_to_rfc3339_string().unwrap_or_default(),
        updated_at: s.updated_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}

/// Guests see whether a date is taken, not by whom.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<RangeQuery>,
) -> Result<Json<Vec<SlotResponse>>, ApiError> {
    let range = parse_range(params.start_date.as_deref(), params.end_date.as_deref())?;
    let slots = state.slots.list_range(&auth.uid, range).await?;
    let response = slots
        .into_iter()
        .map(|s| SlotResponse {
            date: s.date.to_string(),
            available: s.available,
            reserved: s.reserved_by.is_some(),
        })
        .collect();
    Ok(Json(response))
}
