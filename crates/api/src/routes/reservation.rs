use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use hideaway_db::models::Reservation;
use hideaway_services::reservation::ReservationChanges;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{parse_date, parse_reservation_status};
use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, json::ValidJson},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReservationRequest {
    pub date: String,
    pub number_of_guests: i64,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub notes: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateReservationRequest {
    pub date: Option<String>,
    pub number_of_guests: Option<i64>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub date: String,
    pub number_of_guests: u32,
    pub notes: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub cancelled_at: Option<String>,
}

pub(crate) fn to_response(r: Reservation) -> ReservationResponse {
    ReservationResponse {
        id: r.id.map(|id| id.to_hex()).unwrap_or_default(),
        user_id: r.user_id,
        user_name: r.user_name,
        date: r.date.to_string(),
        number_of_guests: r.number_of_guests,
        notes: r.notes,
        status: r.status.as_str().to_string(),
        created_at: r.created_at.try_to_rfc3339_string().unwrap_or_default(),
        updated_at: r.updated_at.try_to_rfc3339_string().unwrap_or_default(),
        cancelled_at: r.cancelled_at.and_then(|d| d.try_to_rfc3339_string().ok()),
    }
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<ReservationResponse>>, ApiError> {
    let status = parse_reservation_status(params.status.as_deref())?;
    let reservations = state.reservations.list_for_user(&auth.uid, status).await?;
    Ok(Json(reservations.into_iter().map(to_response).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(body): ValidJson<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), ApiError> {
    let date = parse_date("date", &body.date)?;
    let reservation = state
        .reservations
        .create(&auth.uid, date, body.number_of_guests, body.notes)
        .await?;

    Ok((StatusCode::CREATED, Json(to_response(reservation))))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ReservationResponse>, ApiError> {
    let reservation = state.reservations.get(&auth.uid, &id).await?;
    Ok(Json(to_response(reservation)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<UpdateReservationRequest>,
) -> Result<Json<ReservationResponse>, ApiError> {
    let changes = ReservationChanges {
        date: body
            .date
            .as_deref()
            .map(|d| parse_date("date", d))
            .transpose()?,
        number_of_guests: body.number_of_guests,
        notes: body.notes,
    };
    let reservation = state.reservations.update(&auth.uid, &id, changes).await?;
    Ok(Json(to_response(reservation)))
}

pub async fn cancel(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ReservationResponse>, ApiError> {
    let reservation = state.reservations.cancel(&auth.uid, &id).await?;
    Ok(Json(to_response(reservation)))
}
