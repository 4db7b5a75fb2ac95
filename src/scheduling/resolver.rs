//! SlotResolver: live bookable slots for a (counsellor, date) pair.
//!
//! For each target the resolver spawns one task that:
//! 1. subscribes to the counsellor's template,
//! 2. takes the template entry for the date's weekday,
//! 3. when that entry is non-empty, subscribes to the ledger change feed
//!    and publishes the entry minus the slots booked on that exact date,
//! 4. republishes whenever the template or a matching booking changes.
//!
//! Every publication is a full [`SlotSnapshot`]. Read failures never reach
//! the caller: a template failure publishes the empty list, a ledger
//! failure publishes whatever [`ReadFailurePolicy`] dictates.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::slots::weekday_of;
use super::store::AvailabilityStore;
use super::traits::AppointmentLedger;
use super::types::{BookingFilter, LedgerChange, SlotSnapshot};
use crate::models::{Appointment, ReadFailurePolicy};

type SnapshotSender = watch::Sender<Option<SlotSnapshot>>;

#[derive(Clone)]
pub struct SlotResolver {
    store: AvailabilityStore,
    ledger: Arc<dyn AppointmentLedger>,
    policy: ReadFailurePolicy,
}

impl SlotResolver {
    pub fn new(store: AvailabilityStore, ledger: Arc<dyn AppointmentLedger>) -> Self {
        Self {
            store,
            ledger,
            policy: ReadFailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ReadFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ReadFailurePolicy {
        self.policy
    }

    /// Start a live resolution. Must be called inside a Tokio runtime.
    ///
    /// An empty `counsellor_id` or a missing `date` publishes the empty list
    /// once and opens no subscriptions.
    pub fn resolve(&self, counsellor_id: &str, date: Option<NaiveDate>) -> SlotWatch {
        let (rx, task) = self.spawn(counsellor_id, date);
        SlotWatch {
            resolver: self.clone(),
            rx,
            task,
        }
    }

    /// Compute a single snapshot without subscribing to anything.
    pub fn resolve_once(&self, counsellor_id: &str, date: Option<NaiveDate>) -> SlotSnapshot {
        let Some(date) = date.filter(|_| !counsellor_id.is_empty()) else {
            return SlotSnapshot::empty(counsellor_id, date);
        };

        let template = match self.store.get_availability(counsellor_id) {
            Ok(template) => template,
            Err(e) => {
                tracing::warn!(counsellor_id, error = %e, "Template read failed, no slots offered");
                return SlotSnapshot {
                    degraded: true,
                    ..SlotSnapshot::empty(counsellor_id, Some(date))
                };
            }
        };

        let day_slots = template.slots_for(weekday_of(date));
        if day_slots.is_empty() {
            return SlotSnapshot::empty(counsellor_id, Some(date));
        }

        let filter = BookingFilter::new(counsellor_id, date);
        let (slots, degraded) = filter_day_slots(self.ledger.as_ref(), &filter, day_slots, self.policy);
        SlotSnapshot {
            counsellor_id: counsellor_id.to_string(),
            date: Some(date),
            slots,
            degraded,
        }
    }

    fn spawn(
        &self,
        counsellor_id: &str,
        date: Option<NaiveDate>,
    ) -> (watch::Receiver<Option<SlotSnapshot>>, Option<JoinHandle<()>>) {
        let (tx, rx) = watch::channel(None);

        let Some(date) = date.filter(|_| !counsellor_id.is_empty()) else {
            tx.send_replace(Some(SlotSnapshot::empty(counsellor_id, date)));
            return (rx, None);
        };

        let task = tokio::spawn(run_resolution(
            self.store.clone(),
            self.ledger.clone(),
            self.policy,
            BookingFilter::new(counsellor_id, date),
            tx,
        ));
        (rx, Some(task))
    }
}

/// Consumer handle for a live resolution.
///
/// Dropping the handle stops the background task.
pub struct SlotWatch {
    resolver: SlotResolver,
    rx: watch::Receiver<Option<SlotSnapshot>>,
    task: Option<JoinHandle<()>>,
}

impl SlotWatch {
    /// Switch to a new (counsellor, date) pair.
    ///
    /// The previous task is aborted and its channel dropped before the new
    /// one starts, so nothing published for the old pair can be observed
    /// through this handle afterwards.
    pub fn retarget(&mut self, counsellor_id: &str, date: Option<NaiveDate>) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        let (rx, task) = self.resolver.spawn(counsellor_id, date);
        self.rx = rx;
        self.task = task;
    }

    /// Latest publication, if any has happened yet.
    pub fn current(&self) -> Option<SlotSnapshot> {
        self.rx.borrow().clone()
    }

    /// Wait for the next publication.
    ///
    /// Returns `None` once the current target will publish nothing more
    /// (trivial targets after their single snapshot, or a finished task).
    pub async fn next(&mut self) -> Option<SlotSnapshot> {
        loop {
            self.rx.changed().await.ok()?;
            if let Some(snapshot) = self.rx.borrow_and_update().clone() {
                return Some(snapshot);
            }
        }
    }
}

impl Drop for SlotWatch {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// `day_slots` without any slot booked in `appointments`, order preserved.
pub fn free_slots(day_slots: &[String], appointments: &[Appointment]) -> Vec<String> {
    let booked: HashSet<&str> = appointments.iter().map(|a| a.time.as_str()).collect();
    day_slots
        .iter()
        .filter(|slot| !booked.contains(slot.as_str()))
        .cloned()
        .collect()
}

/// Read the ledger once and filter; on failure fall back per `policy`.
///
/// Returns the slots and whether they came from the fallback.
fn filter_day_slots(
    ledger: &dyn AppointmentLedger,
    filter: &BookingFilter,
    day_slots: &[String],
    policy: ReadFailurePolicy,
) -> (Vec<String>, bool) {
    match ledger.snapshot(filter) {
        Ok(appointments) => (free_slots(day_slots, &appointments), false),
        Err(e) => {
            tracing::warn!(
                counsellor_id = %filter.counsellor_id,
                date = %filter.date,
                policy = %policy,
                error = %e,
                "Booking read failed, publishing fallback slots"
            );
            (policy.fallback(day_slots), true)
        }
    }
}

fn publish(tx: &SnapshotSender, filter: &BookingFilter, slots: Vec<String>, degraded: bool) {
    tx.send_replace(Some(SlotSnapshot {
        counsellor_id: filter.counsellor_id.clone(),
        date: Some(filter.date),
        slots,
        degraded,
    }));
}

async fn next_change(
    bookings: &mut Option<broadcast::Receiver<LedgerChange>>,
) -> Result<LedgerChange, RecvError> {
    match bookings {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn run_resolution(
    store: AvailabilityStore,
    ledger: Arc<dyn AppointmentLedger>,
    policy: ReadFailurePolicy,
    filter: BookingFilter,
    tx: SnapshotSender,
) {
    let weekday = weekday_of(filter.date);

    let mut template_rx = match store.subscribe(&filter.counsellor_id) {
        Ok(Some(rx)) => rx,
        Ok(None) => {
            publish(&tx, &filter, Vec::new(), false);
            return;
        }
        Err(e) => {
            tracing::warn!(
                counsellor_id = %filter.counsellor_id,
                error = %e,
                "Template read failed, no slots offered"
            );
            publish(&tx, &filter, Vec::new(), true);
            return;
        }
    };

    let mut bookings: Option<broadcast::Receiver<LedgerChange>> = None;

    loop {
        let day_slots = template_rx.borrow_and_update().slots_for(weekday).to_vec();

        if day_slots.is_empty() {
            bookings = None;
            publish(&tx, &filter, Vec::new(), false);
        } else {
            // Subscribe before reading so a booking landing in between is
            // picked up by the next change.
            if bookings.is_none() {
                bookings = Some(ledger.changes());
            }
            let (slots, degraded) = filter_day_slots(ledger.as_ref(), &filter, &day_slots, policy);
            publish(&tx, &filter, slots, degraded);
        }

        loop {
            tokio::select! {
                _ = tx.closed() => return,
                changed = template_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    break;
                }
                change = next_change(&mut bookings) => match change {
                    Ok(change) if filter.matches(&change) => {
                        let (slots, degraded) =
                            filter_day_slots(ledger.as_ref(), &filter, &day_slots, policy);
                        publish(&tx, &filter, slots, degraded);
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Booking feed lagged, re-reading snapshot");
                        let (slots, degraded) =
                            filter_day_slots(ledger.as_ref(), &filter, &day_slots, policy);
                        publish(&tx, &filter, slots, degraded);
                    }
                    Err(RecvError::Closed) => {
                        tracing::warn!(
                            counsellor_id = %filter.counsellor_id,
                            "Booking feed closed, publishing fallback slots"
                        );
                        bookings = None;
                        publish(&tx, &filter, policy.fallback(&day_slots), true);
                    }
                },
            }
        }
    }
}
