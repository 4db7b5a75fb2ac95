//! SQLite appointment ledger with a change feed.
//!
//! Writes go through `book` / `cancel`; each successful write broadcasts a
//! `LedgerChange` naming the (counsellor, date) it touched. Readers that
//! need live results subscribe to `changes()` and re-read `snapshot()`.
//!
//! Booking performs no conditional insert: two students can book the same
//! (counsellor, date, slot) if both requests land before either sees the
//! other. Closing that gap needs a uniqueness constraint or a reservation
//! step at this layer.

use std::cmp::Ordering;

use chrono::{NaiveDate, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::error::{BookingError, SubscriptionError};
use super::slots::compare_slots;
use super::traits::AppointmentLedger;
use super::types::{BookingFilter, LedgerChange};
use crate::db::{self, SharedConnection};
use crate::models::{Appointment, NewAppointment};

/// Buffered changes per receiver before it lags.
const CHANGE_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct SqliteLedger {
    conn: SharedConnection,
    changes: broadcast::Sender<LedgerChange>,
}

impl SqliteLedger {
    pub fn new(conn: SharedConnection) -> Self {
        Self::with_capacity(conn, CHANGE_CAPACITY)
    }

    /// Ledger whose change feed buffers `capacity` entries per receiver.
    pub fn with_capacity(conn: SharedConnection, capacity: usize) -> Self {
        let (changes, _) = broadcast::channel(capacity);
        Self { conn, changes }
    }

    /// Record a booking and notify subscribers of its (counsellor, date).
    pub fn book(&self, request: NewAppointment) -> Result<Appointment, BookingError> {
        if request.counsellor_id.trim().is_empty() {
            return Err(BookingError::MissingField("counsellor_id"));
        }
        if request.student_id.trim().is_empty() {
            return Err(BookingError::MissingField("student_id"));
        }
        if request.time.trim().is_empty() {
            return Err(BookingError::MissingField("time"));
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            counsellor_id: request.counsellor_id,
            counsellor_name: request.counsellor_name,
            student_id: request.student_id,
            student_name: request.student_name,
            date: request.date,
            time: request.time,
            reason: request.reason,
            share_medical_info: request.share_medical_info,
            created_at: Utc::now(),
        };

        {
            let conn = db::lock(&self.conn)?;
            db::insert_appointment(&conn, &appointment)?;
        }

        tracing::info!(
            appointment_id = %appointment.id,
            counsellor_id = %appointment.counsellor_id,
            date = %appointment.date,
            time = %appointment.time,
            "Appointment booked"
        );
        self.notify(&appointment);
        Ok(appointment)
    }

    /// Delete a booking, freeing its slot.
    pub fn cancel(&self, appointment_id: &Uuid) -> Result<Appointment, BookingError> {
        let appointment = {
            let conn = db::lock(&self.conn)?;
            let appointment = db::get_appointment(&conn, appointment_id)?
                .ok_or(BookingError::NotFound(*appointment_id))?;
            db::delete_appointment(&conn, appointment_id)?;
            appointment
        };

        tracing::info!(
            appointment_id = %appointment.id,
            counsellor_id = %appointment.counsellor_id,
            date = %appointment.date,
            "Appointment cancelled"
        );
        self.notify(&appointment);
        Ok(appointment)
    }

    /// Counsellor dashboard: all bookings, by date then slot time.
    pub fn for_counsellor(&self, counsellor_id: &str) -> Result<Vec<Appointment>, BookingError> {
        let conn = db::lock(&self.conn)?;
        let mut appointments = db::get_appointments_for_counsellor(&conn, counsellor_id)?;
        sort_chronologically(&mut appointments);
        Ok(appointments)
    }

    pub fn for_counsellor_on(
        &self,
        counsellor_id: &str,
        date: &NaiveDate,
    ) -> Result<Vec<Appointment>, BookingError> {
        let conn = db::lock(&self.conn)?;
        let mut appointments = db::get_appointments_for_counsellor_on(&conn, counsellor_id, date)?;
        sort_chronologically(&mut appointments);
        Ok(appointments)
    }

    /// Student view: all of a student's bookings, by date then slot time.
    pub fn for_student(&self, student_id: &str) -> Result<Vec<Appointment>, BookingError> {
        let conn = db::lock(&self.conn)?;
        let mut appointments = db::get_appointments_for_student(&conn, student_id)?;
        sort_chronologically(&mut appointments);
        Ok(appointments)
    }

    fn notify(&self, appointment: &Appointment) {
        // Err only means nobody is listening.
        let _ = self.changes.send(LedgerChange {
            counsellor_id: appointment.counsellor_id.clone(),
            date: appointment.date,
        });
    }
}

impl AppointmentLedger for SqliteLedger {
    fn snapshot(&self, filter: &BookingFilter) -> Result<Vec<Appointment>, SubscriptionError> {
        let conn = db::lock(&self.conn)?;
        Ok(db::get_appointments_for_counsellor_on(
            &conn,
            &filter.counsellor_id,
            &filter.date,
        )?)
    }

    fn changes(&self) -> broadcast::Receiver<LedgerChange> {
        self.changes.subscribe()
    }
}

fn sort_chronologically(appointments: &mut [Appointment]) {
    appointments.sort_by(|a, b| match a.date.cmp(&b.date) {
        Ordering::Equal => compare_slots(&a.time, &b.time),
        other => other,
    });
}
