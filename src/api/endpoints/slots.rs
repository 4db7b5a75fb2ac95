//! Bookable slots and the editor catalog.
//!
//! - `GET /api/counsellors/:id/slots?date=YYYY-MM-DD`: one resolution
//! - `GET /api/slot-catalog`: selectable labels and weekday order

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{parse_optional_date, ApiContext};
use crate::models::DayOfWeek;
use crate::scheduling::slots::SLOT_CATALOG;
use crate::scheduling::SlotSnapshot;

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: Option<String>,
}

pub async fn resolve(
    State(ctx): State<ApiContext>,
    Path(counsellor_id): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotSnapshot>, ApiError> {
    let date = parse_optional_date(query.date.as_deref())?;
    Ok(Json(ctx.core.resolver().resolve_once(&counsellor_id, date)))
}

#[derive(Serialize)]
pub struct CatalogResponse {
    pub slots: &'static [&'static str],
    pub days: [DayOfWeek; 7],
}

pub async fn catalog() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        slots: &SLOT_CATALOG,
        days: DayOfWeek::ALL,
    })
}
