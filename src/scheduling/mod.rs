//! Counsellor scheduling: weekly availability templates, the appointment
//! ledger, and live resolution of bookable slots for a calendar date.
//!
//! ```text
//! AvailabilityStore ──┐
//!                     ├──▶ SlotResolver ──▶ SlotWatch (live SlotSnapshot)
//! AppointmentLedger ──┘
//! ```
//!
//! Both inputs are injected behind traits so the resolver can be driven by
//! the SQLite implementations in production and by stubs in tests.

pub mod error;
pub mod ledger;
pub mod resolver;
pub mod slots;
pub mod store;
pub mod traits;
pub mod types;

pub use error::{BookingError, StorageWriteError, SubscriptionError};
pub use ledger::SqliteLedger;
pub use resolver::{free_slots, SlotResolver, SlotWatch};
pub use store::{AvailabilityStore, AvailabilityWatch, SqliteAvailability};
pub use traits::{AppointmentLedger, AvailabilityBackend};
pub use types::{BookingFilter, LedgerChange, SlotSnapshot};
