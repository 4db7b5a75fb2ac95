//! AvailabilityStore: weekly templates with live reads.
//!
//! Each counsellor with at least one subscriber gets a `watch` channel.
//! Saves write through the backend and then replace the channel value
//! while holding the watchers lock, so subscribers always observe the
//! templates in write order.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use super::error::{StorageWriteError, SubscriptionError};
use super::traits::AvailabilityBackend;
use crate::db::{self, SharedConnection};
use crate::models::WeeklyAvailability;

type Watchers = Arc<Mutex<HashMap<String, watch::Sender<WeeklyAvailability>>>>;

/// Live view of one counsellor's template.
///
/// Derefs to the underlying `watch::Receiver`. Dropping the last view of a
/// counsellor removes its channel from the store.
pub struct AvailabilityWatch {
    counsellor_id: String,
    rx: watch::Receiver<WeeklyAvailability>,
    watchers: Watchers,
}

impl Deref for AvailabilityWatch {
    type Target = watch::Receiver<WeeklyAvailability>;

    fn deref(&self) -> &Self::Target {
        &self.rx
    }
}

impl DerefMut for AvailabilityWatch {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.rx
    }
}

impl Drop for AvailabilityWatch {
    fn drop(&mut self) {
        let Ok(mut watchers) = self.watchers.lock() else {
            return;
        };
        // `self.rx` is still alive here, so the last view counts one.
        let last = watchers
            .get(&self.counsellor_id)
            .is_some_and(|tx| tx.receiver_count() <= 1);
        if last {
            watchers.remove(&self.counsellor_id);
            tracing::debug!(counsellor_id = %self.counsellor_id, "Availability watch closed");
        }
    }
}

#[derive(Clone)]
pub struct AvailabilityStore {
    backend: Arc<dyn AvailabilityBackend>,
    watchers: Watchers,
}

impl AvailabilityStore {
    pub fn new(backend: Arc<dyn AvailabilityBackend>) -> Self {
        Self {
            backend,
            watchers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Current template for a counsellor.
    ///
    /// Missing records and an empty id both read as the empty template.
    pub fn get_availability(&self, counsellor_id: &str) -> Result<WeeklyAvailability, SubscriptionError> {
        if counsellor_id.is_empty() {
            return Ok(WeeklyAvailability::new());
        }

        {
            let watchers = self.watchers.lock().map_err(|_| SubscriptionError::LockPoisoned)?;
            if let Some(tx) = watchers.get(counsellor_id) {
                return Ok(tx.borrow().clone());
            }
        }

        Ok(self.backend.load(counsellor_id)?.unwrap_or_default())
    }

    /// Subscribe to a counsellor's template.
    ///
    /// The view starts at the current template and is notified on every
    /// successful save. An empty id yields `Ok(None)`: nothing to watch.
    pub fn subscribe(&self, counsellor_id: &str) -> Result<Option<AvailabilityWatch>, SubscriptionError> {
        if counsellor_id.is_empty() {
            return Ok(None);
        }

        let mut watchers = self.watchers.lock().map_err(|_| SubscriptionError::LockPoisoned)?;
        // Channels whose views were cloned out and dropped have no guard left.
        watchers.retain(|_, tx| tx.receiver_count() > 0);

        let rx = match watchers.get(counsellor_id) {
            Some(tx) => tx.subscribe(),
            None => {
                let initial = self.backend.load(counsellor_id)?.unwrap_or_default();
                let (tx, rx) = watch::channel(initial);
                watchers.insert(counsellor_id.to_string(), tx);
                tracing::debug!(counsellor_id, "Availability watch opened");
                rx
            }
        };

        Ok(Some(AvailabilityWatch {
            counsellor_id: counsellor_id.to_string(),
            rx,
            watchers: self.watchers.clone(),
        }))
    }

    /// Number of counsellors with an open channel.
    pub fn watched_count(&self) -> usize {
        self.watchers.lock().map(|w| w.len()).unwrap_or(0)
    }

    /// Replace the counsellor's whole template.
    ///
    /// On success every subscriber receives `template`. On failure nothing
    /// is published and the error is returned as is.
    pub fn save_availability(
        &self,
        counsellor_id: &str,
        template: WeeklyAvailability,
    ) -> Result<(), StorageWriteError> {
        if counsellor_id.is_empty() {
            return Err(StorageWriteError::MissingCounsellor);
        }

        let mut watchers = self.watchers.lock().map_err(|_| StorageWriteError::LockPoisoned)?;
        self.backend.store(counsellor_id, &template)?;
        tracing::info!(counsellor_id, days = template.len(), "Availability saved");

        if let Some(tx) = watchers.get(counsellor_id) {
            if tx.receiver_count() == 0 {
                watchers.remove(counsellor_id);
            } else {
                tx.send_replace(template);
            }
        }
        Ok(())
    }
}

/// SQLite-backed template storage.
pub struct SqliteAvailability {
    conn: SharedConnection,
}

impl SqliteAvailability {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl AvailabilityBackend for SqliteAvailability {
    fn load(&self, counsellor_id: &str) -> Result<Option<WeeklyAvailability>, SubscriptionError> {
        let conn = db::lock(&self.conn)?;
        Ok(db::get_availability(&conn, counsellor_id)?)
    }

    fn store(&self, counsellor_id: &str, template: &WeeklyAvailability) -> Result<(), StorageWriteError> {
        let conn = db::lock(&self.conn)?;
        db::upsert_availability(&conn, counsellor_id, template)?;
        Ok(())
    }
}
