use chrono::Utc;
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::*;

/// Load a counsellor's stored template. `None` when nothing was ever saved.
///
/// A document that is not valid JSON decodes to the empty template.
pub fn get_availability(
    conn: &Connection,
    counsellor_id: &str,
) -> Result<Option<WeeklyAvailability>, DatabaseError> {
    let result = conn.query_row(
        "SELECT template FROM availabilities WHERE counsellor_id = ?1",
        params![counsellor_id],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(raw) => match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(doc) => Ok(Some(WeeklyAvailability::from_document(&doc))),
            Err(e) => {
                tracing::warn!(
                    counsellor_id,
                    error = %e,
                    "Stored availability is not valid JSON, treating as empty"
                );
                Ok(Some(WeeklyAvailability::new()))
            }
        },
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Replace the whole template for a counsellor in one statement.
pub fn upsert_availability(
    conn: &Connection,
    counsellor_id: &str,
    template: &WeeklyAvailability,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO availabilities (counsellor_id, template, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(counsellor_id) DO UPDATE
         SET template = excluded.template, updated_at = excluded.updated_at",
        params![
            counsellor_id,
            template.to_document().to_string(),
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}
