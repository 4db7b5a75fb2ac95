//! Repository layer: entity-scoped database operations.
//!
//! Functions take a borrowed `Connection`; locking and change notification
//! live one layer up in `scheduling`.

mod appointment;
mod availability;

// Re-export all public items from sub-modules
pub use appointment::*;
pub use availability::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use crate::db::sqlite::open_memory_database;
    use crate::db::DatabaseError;
    use crate::models::*;
    use rusqlite::Connection;
    use uuid::Uuid;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn make_appointment(conn: &Connection, counsellor: &str, student: &str, date: NaiveDate, time: &str) -> Appointment {
        let appt = Appointment {
            id: Uuid::new_v4(),
            counsellor_id: counsellor.into(),
            counsellor_name: Some("Dr. Rao".into()),
            student_id: student.into(),
            student_name: Some("Asha".into()),
            date,
            time: time.into(),
            reason: None,
            share_medical_info: true,
            created_at: Utc.with_ymd_and_hms(2023, 12, 20, 10, 0, 0).unwrap(),
        };
        insert_appointment(conn, &appt).unwrap();
        appt
    }

    #[test]
    fn availability_absent_is_none() {
        let conn = test_db();
        assert!(get_availability(&conn, "nobody").unwrap().is_none());
    }

    #[test]
    fn availability_upsert_replaces_whole_template() {
        let conn = test_db();
        let first = WeeklyAvailability::new()
            .with_day(DayOfWeek::Monday, ["09:00 AM"])
            .with_day(DayOfWeek::Friday, ["02:00 PM"]);
        upsert_availability(&conn, "c-1", &first).unwrap();

        let second = WeeklyAvailability::new().with_day(DayOfWeek::Tuesday, ["10:00 AM"]);
        upsert_availability(&conn, "c-1", &second).unwrap();

        let stored = get_availability(&conn, "c-1").unwrap().unwrap();
        assert_eq!(stored, second);
        assert!(stored.slots_for(DayOfWeek::Friday).is_empty());
    }

    #[test]
    fn availability_is_keyed_by_counsellor() {
        let conn = test_db();
        let template = WeeklyAvailability::new().with_day(DayOfWeek::Monday, ["09:00 AM"]);
        upsert_availability(&conn, "c-1", &template).unwrap();
        assert!(get_availability(&conn, "c-2").unwrap().is_none());
    }

    #[test]
    fn corrupt_availability_document_reads_as_empty() {
        let conn = test_db();
        conn.execute(
            "INSERT INTO availabilities (counsellor_id, template, updated_at)
             VALUES ('c-1', 'not json', '2024-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        let stored = get_availability(&conn, "c-1").unwrap().unwrap();
        assert!(stored.is_empty());
    }

    #[test]
    fn appointment_insert_and_retrieve() {
        let conn = test_db();
        let appt = make_appointment(&conn, "c-1", "s-1", monday(), "09:00 AM");
        let loaded = get_appointment(&conn, &appt.id).unwrap().unwrap();
        assert_eq!(loaded, appt);
    }

    #[test]
    fn appointment_missing_is_none() {
        let conn = test_db();
        assert!(get_appointment(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn appointments_filtered_by_counsellor_and_exact_date() {
        let conn = test_db();
        make_appointment(&conn, "c-1", "s-1", monday(), "09:00 AM");
        make_appointment(&conn, "c-1", "s-2", monday().succ_opt().unwrap(), "09:00 AM");
        make_appointment(&conn, "c-2", "s-3", monday(), "10:00 AM");

        let found = get_appointments_for_counsellor_on(&conn, "c-1", &monday()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].student_id, "s-1");
    }

    #[test]
    fn appointments_for_student_span_counsellors() {
        let conn = test_db();
        make_appointment(&conn, "c-1", "s-1", monday(), "09:00 AM");
        make_appointment(&conn, "c-2", "s-1", monday(), "02:00 PM");
        make_appointment(&conn, "c-2", "s-2", monday(), "03:00 PM");

        assert_eq!(get_appointments_for_student(&conn, "s-1").unwrap().len(), 2);
        assert_eq!(get_appointments_for_counsellor(&conn, "c-2").unwrap().len(), 2);
    }

    #[test]
    fn delete_appointment_removes_row() {
        let conn = test_db();
        let appt = make_appointment(&conn, "c-1", "s-1", monday(), "09:00 AM");
        delete_appointment(&conn, &appt.id).unwrap();
        assert!(get_appointment(&conn, &appt.id).unwrap().is_none());
    }

    #[test]
    fn delete_missing_appointment_is_not_found() {
        let conn = test_db();
        let err = delete_appointment(&conn, &Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn corrupt_appointment_date_is_reported() {
        let conn = test_db();
        conn.execute(
            "INSERT INTO appointments (id, counsellor_id, student_id, date, time, created_at)
             VALUES (?1, 'c-1', 's-1', 'someday', '09:00 AM', '2024-01-01T00:00:00Z')",
            [Uuid::new_v4().to_string()],
        )
        .unwrap();
        let err = get_appointments_for_counsellor(&conn, "c-1").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidValue { .. }));
    }

    #[test]
    fn corrupt_created_at_is_reported() {
        let conn = test_db();
        conn.execute(
            "INSERT INTO appointments (id, counsellor_id, student_id, date, time, created_at)
             VALUES (?1, 'c-1', 's-1', '2024-01-01', '09:00 AM', 'yesterday-ish')",
            [Uuid::new_v4().to_string()],
        )
        .unwrap();
        let err = get_appointments_for_counsellor(&conn, "c-1").unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::InvalidValue { ref field, .. } if field == "appointments.created_at"
        ));
    }
}
