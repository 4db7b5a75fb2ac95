//! Counsellor weekly availability.
//!
//! - `GET /api/counsellors/:id/availability`: current template
//! - `PUT /api/counsellors/:id/availability`: replace the whole template

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::WeeklyAvailability;

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub counsellor_id: String,
    pub availability: WeeklyAvailability,
}

pub async fn get(
    State(ctx): State<ApiContext>,
    Path(counsellor_id): Path<String>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let availability = ctx.core.availability().get_availability(&counsellor_id)?;
    Ok(Json(AvailabilityResponse {
        counsellor_id,
        availability,
    }))
}

/// Whole-template replacement. Malformed days in the body are dropped on
/// decode; the stored result is echoed back.
pub async fn put(
    State(ctx): State<ApiContext>,
    Path(counsellor_id): Path<String>,
    Json(availability): Json<WeeklyAvailability>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    ctx.core
        .availability()
        .save_availability(&counsellor_id, availability.clone())?;
    Ok(Json(AvailabilityResponse {
        counsellor_id,
        availability,
    }))
}
