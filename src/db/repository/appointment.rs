use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

const APPOINTMENT_COLUMNS: &str = "id, counsellor_id, counsellor_name, student_id, student_name,
     date, time, reason, share_medical_info, created_at";

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, counsellor_id, counsellor_name, student_id, student_name,
         date, time, reason, share_medical_info, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            appt.id.to_string(),
            appt.counsellor_id,
            appt.counsellor_name,
            appt.student_id,
            appt.student_name,
            appt.date.to_string(),
            appt.time,
            appt.reason,
            appt.share_medical_info as i32,
            appt.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &Uuid) -> Result<Option<Appointment>, DatabaseError> {
    let sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1");
    let result = conn.query_row(&sql, params![id.to_string()], read_row);

    match result {
        Ok(row) => Ok(Some(appointment_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn delete_appointment(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM appointments WHERE id = ?1",
        params![id.to_string()],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Appointments for one counsellor on one calendar date.
///
/// The date is matched as its `YYYY-MM-DD` string; time of day plays no part.
pub fn get_appointments_for_counsellor_on(
    conn: &Connection,
    counsellor_id: &str,
    date: &NaiveDate,
) -> Result<Vec<Appointment>, DatabaseError> {
    let sql = format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE counsellor_id = ?1 AND date = ?2
         ORDER BY created_at"
    );
    query_appointments(conn, &sql, params![counsellor_id, date.to_string()])
}

pub fn get_appointments_for_counsellor(
    conn: &Connection,
    counsellor_id: &str,
) -> Result<Vec<Appointment>, DatabaseError> {
    let sql = format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE counsellor_id = ?1
         ORDER BY date, created_at"
    );
    query_appointments(conn, &sql, params![counsellor_id])
}

pub fn get_appointments_for_student(
    conn: &Connection,
    student_id: &str,
) -> Result<Vec<Appointment>, DatabaseError> {
    let sql = format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE student_id = ?1
         ORDER BY date, created_at"
    );
    query_appointments(conn, &sql, params![student_id])
}

fn query_appointments(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, read_row)?;

    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(appointment_from_row(row?)?);
    }
    Ok(appointments)
}

// Internal row type for Appointment mapping
struct AppointmentRow {
    id: String,
    counsellor_id: String,
    counsellor_name: Option<String>,
    student_id: String,
    student_name: Option<String>,
    date: String,
    time: String,
    reason: Option<String>,
    share_medical_info: i32,
    created_at: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<AppointmentRow> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        counsellor_id: row.get(1)?,
        counsellor_name: row.get(2)?,
        student_id: row.get(3)?,
        student_name: row.get(4)?,
        date: row.get(5)?,
        time: row.get(6)?,
        reason: row.get(7)?,
        share_medical_info: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn appointment_from_row(row: AppointmentRow) -> Result<Appointment, DatabaseError> {
    let id = Uuid::parse_str(&row.id).map_err(|_| DatabaseError::InvalidValue {
        field: "appointments.id".into(),
        value: row.id.clone(),
    })?;
    let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|_| {
        DatabaseError::InvalidValue {
            field: "appointments.date".into(),
            value: row.date.clone(),
        }
    })?;
    let created_at = DateTime::parse_from_rfc3339(&row.created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DatabaseError::InvalidValue {
            field: "appointments.created_at".into(),
            value: row.created_at.clone(),
        })?;

    Ok(Appointment {
        id,
        counsellor_id: row.counsellor_id,
        counsellor_name: row.counsellor_name,
        student_id: row.student_id,
        student_name: row.student_name,
        date,
        time: row.time,
        reason: row.reason,
        share_medical_info: row.share_medical_info != 0,
        created_at,
    })
}
