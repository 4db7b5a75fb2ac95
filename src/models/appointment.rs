use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A confirmed booking in the appointment ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub counsellor_id: String,
    pub counsellor_name: Option<String>,
    pub student_id: String,
    pub student_name: Option<String>,
    pub date: NaiveDate,
    /// Slot label, e.g. "09:00 AM".
    pub time: String,
    pub reason: Option<String>,
    pub share_medical_info: bool,
    pub created_at: DateTime<Utc>,
}

/// Booking request as submitted by the student-facing workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub counsellor_id: String,
    #[serde(default)]
    pub counsellor_name: Option<String>,
    pub student_id: String,
    #[serde(default)]
    pub student_name: Option<String>,
    pub date: NaiveDate,
    pub time: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub share_medical_info: bool,
}
