//! Seams injected into the store and the resolver.

use tokio::sync::broadcast;

use super::error::{StorageWriteError, SubscriptionError};
use super::types::{BookingFilter, LedgerChange};
use crate::models::{Appointment, WeeklyAvailability};

/// Durable storage of weekly templates, keyed by counsellor.
pub trait AvailabilityBackend: Send + Sync {
    /// `Ok(None)` when the counsellor never saved a template.
    fn load(&self, counsellor_id: &str) -> Result<Option<WeeklyAvailability>, SubscriptionError>;

    /// Replace the counsellor's template in one atomic write.
    fn store(&self, counsellor_id: &str, template: &WeeklyAvailability) -> Result<(), StorageWriteError>;
}

/// Read side of the appointment ledger.
///
/// A live subscription is `changes()` followed by `snapshot()`: subscribe
/// first, then re-read the snapshot whenever a matching change arrives.
pub trait AppointmentLedger: Send + Sync {
    fn snapshot(&self, filter: &BookingFilter) -> Result<Vec<Appointment>, SubscriptionError>;

    fn changes(&self) -> broadcast::Receiver<LedgerChange>;
}
