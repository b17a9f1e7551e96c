//! Owner-only endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use hideaway_db::models::Notification;
use hideaway_services::calendar::{AvailabilityReport, ReconcileReport};
use hideaway_services::reservation::ReminderReport;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{
    auth::{UserResponse, to_user_response},
    parse_date, parse_range, parse_reservation_status, parse_user_status,
    reservation::{self, ReservationResponse},
    slot::{AdminSlotResponse, RangeQuery, to_admin_response},
};
use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, json::ValidJson},
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetUserStatusRequest {
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReservationListQuery {
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetAvailabilityRequest {
    #[validate(length(max = 366))]
    pub dates: Vec<String>,
    pub available: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetSlotRequest {
    pub available: bool,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReminderRequest {
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: String,
    pub user_id: String,
    pub notification_type: String,
    pub reservation_id: Option<String>,
    pub message: String,
    pub status: String,
    pub error: Option<String>,
    pub sent_at: String,
}

fn to_notification_response(n: Notification) -> NotificationResponse {
    NotificationResponse {
        id: n.id.map(|id| id.to_hex()).unwrap_or_default(),
        user_id: n.user_id,
        notification_type: n.notification_type.as_str().to_string(),
        reservation_id: n.reservation_id.map(|id| id.to_hex()),
        message: n.message,
        status: n.status.as_str().to_string(),
        error: n.error,
        sent_at: n.sent_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<UserListQuery>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let status = params.status.as_deref().map(parse_user_status).transpose()?;
    let users = state.users.list(&auth.uid, status).await?;
    Ok(Json(users.into_iter().map(to_user_response).collect()))
}

pub async fn set_user_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(uid): Path<String>,
    ValidJson(body): ValidJson<SetUserStatusRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let status = parse_user_status(&body.status)?;
    let user = state.users.set_status(&auth.uid, &uid, status).await?;
    Ok(Json(to_user_response(user)))
}

pub async fn list_reservations(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ReservationListQuery>,
) -> Result<Json<Vec<ReservationResponse>>, ApiError> {
    let status = parse_reservation_status(params.status.as_deref())?;
    let range = parse_range(params.start_date.as_deref(), params.end_date.as_deref())?;
    let reservations = state
        .reservations
        .list_all(&auth.uid, status, range)
        .await?;
    Ok(Json(
        reservations.into_iter().map(reservation::to_response).collect(),
    ))
}

pub async fn list_slots(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<RangeQuery>,
) -> Result<Json<Vec<AdminSlotResponse>>, ApiError> {
    state.users.require_owner(&auth.uid).await?;
    let range = parse_range(params.start_date.as_deref(), params.end_date.as_deref())?;
    let slots = state.slots.list_range(&auth.uid, range).await?;
    Ok(Json(slots.into_iter().map(to_admin_response).collect()))
}

pub async fn set_availability(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(body): ValidJson<SetAvailabilityRequest>,
) -> Result<Json<AvailabilityReport>, ApiError> {
    let dates = body
        .dates
        .iter()
        .map(|d| parse_date("dates", d))
        .collect::<Result<Vec<_>, _>>()?;
    let report = state
        .slots
        .set_availability(&auth.uid, &dates, body.available)
        .await?;
    Ok(Json(report))
}

pub async fn set_slot(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(date): Path<String>,
    ValidJson(body): ValidJson<SetSlotRequest>,
) -> Result<Json<AdminSlotResponse>, ApiError> {
    let date = parse_date("date", &date)?;
    let slot = state.slots.set_one(&auth.uid, date, body.available).await?;
    Ok(Json(to_admin_response(slot)))
}

pub async fn reconcile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ReconcileReport>, ApiError> {
    Ok(Json(state.slots.reconcile(&auth.uid).await?))
}

pub async fn send_reminders(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(body): ValidJson<ReminderRequest>,
) -> Result<Json<ReminderReport>, ApiError> {
    let date = body
        .date
        .as_deref()
        .map(|d| parse_date("date", d))
        .transpose()?;
    Ok(Json(state.reservations.send_reminders(&auth.uid, date).await?))
}

pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<NotificationQuery>,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    state.users.require_owner(&auth.uid).await?;
    let notifications = state
        .notifications
        .history(params.user_id.as_deref())
        .await?;
    Ok(Json(
        notifications
            .into_iter()
            .map(to_notification_response)
            .collect(),
    ))
}
