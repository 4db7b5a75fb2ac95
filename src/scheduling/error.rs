//! Scheduling error types.
//!
//! Write failures surface to the caller; read failures are absorbed by the
//! resolver and only ever appear as degraded snapshots.

use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;

/// Saving an availability template failed. Not retried internally.
#[derive(Error, Debug)]
pub enum StorageWriteError {
    #[error("Counsellor id is required")]
    MissingCounsellor,

    #[error("Failed to write availability: {0}")]
    Database(#[from] DatabaseError),

    #[error("Availability watchers lock poisoned")]
    LockPoisoned,
}

/// A template read or ledger read failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("Read failed: {0}")]
    Read(String),

    #[error("Availability watchers lock poisoned")]
    LockPoisoned,
}

impl From<DatabaseError> for SubscriptionError {
    fn from(err: DatabaseError) -> Self {
        SubscriptionError::Read(err.to_string())
    }
}

/// Booking workflow errors raised by the ledger's write side.
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Appointment not found: {0}")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
