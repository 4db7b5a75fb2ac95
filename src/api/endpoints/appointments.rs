//! Appointment endpoints.
//!
//! - `GET /api/counsellors/:id/appointments[?date=]`: counsellor dashboard
//! - `GET /api/students/:id/appointments`: a student's bookings
//! - `POST /api/appointments`: book a slot
//! - `DELETE /api/appointments/:id`: cancel

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{parse_appointment_id, parse_optional_date, ApiContext};
use crate::models::{Appointment, NewAppointment};

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

#[derive(Deserialize)]
pub struct CounsellorQuery {
    pub date: Option<String>,
}

pub async fn for_counsellor(
    State(ctx): State<ApiContext>,
    Path(counsellor_id): Path<String>,
    Query(query): Query<CounsellorQuery>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let ledger = ctx.core.ledger();
    let appointments = match parse_optional_date(query.date.as_deref())? {
        Some(date) => ledger.for_counsellor_on(&counsellor_id, &date)?,
        None => ledger.for_counsellor(&counsellor_id)?,
    };
    Ok(Json(AppointmentsResponse { appointments }))
}

pub async fn for_student(
    State(ctx): State<ApiContext>,
    Path(student_id): Path<String>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let appointments = ctx.core.ledger().for_student(&student_id)?;
    Ok(Json(AppointmentsResponse { appointments }))
}

pub async fn book(
    State(ctx): State<ApiContext>,
    Json(request): Json<NewAppointment>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let appointment = ctx.core.ledger().book(request)?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn cancel(
    State(ctx): State<ApiContext>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Appointment>, ApiError> {
    let id = parse_appointment_id(&appointment_id)?;
    let cancelled = ctx.core.ledger().cancel(&id)?;
    Ok(Json(cancelled))
}
