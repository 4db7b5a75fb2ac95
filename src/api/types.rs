//! Shared types for the API layer.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::core_state::CoreState;

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// Parse a `YYYY-MM-DD` calendar date from a path or query value.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Invalid date '{raw}', expected YYYY-MM-DD")))
}

/// Parse an optional date; absent or blank means "no date selected".
pub fn parse_optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_date(raw).map(Some),
        None => Ok(None),
    }
}

pub fn parse_appointment_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid appointment ID format".into()))
}
