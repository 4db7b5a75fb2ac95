//! Transport-agnostic application state.
//!
//! `CoreState` is constructed once at startup and shared by the REST
//! handlers and the WebSocket layer. It owns the database handle and the
//! three scheduling components wired on top of it.

use std::path::Path;
use std::sync::Arc;

use crate::db::{self, DatabaseError, SharedConnection};
use crate::models::ReadFailurePolicy;
use crate::scheduling::{AvailabilityStore, SlotResolver, SqliteAvailability, SqliteLedger};

pub struct CoreState {
    conn: SharedConnection,
    availability: AvailabilityStore,
    ledger: Arc<SqliteLedger>,
    resolver: SlotResolver,
}

impl CoreState {
    /// Open (creating if needed) the database at `path` and wire components.
    pub fn open(path: &Path, policy: ReadFailurePolicy) -> Result<Self, CoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::DataDir(e.to_string()))?;
        }
        let conn = db::open_database(path)?;
        tracing::info!(path = %path.display(), %policy, "Scheduling database opened");
        Ok(Self::from_connection(db::share(conn), policy))
    }

    /// In-memory state, used by tests and throwaway runs.
    pub fn in_memory() -> Result<Self, CoreError> {
        let conn = db::open_memory_database()?;
        Ok(Self::from_connection(db::share(conn), ReadFailurePolicy::default()))
    }

    pub fn from_connection(conn: SharedConnection, policy: ReadFailurePolicy) -> Self {
        let availability = AvailabilityStore::new(Arc::new(SqliteAvailability::new(conn.clone())));
        let ledger = Arc::new(SqliteLedger::new(conn.clone()));
        let resolver = SlotResolver::new(availability.clone(), ledger.clone()).with_policy(policy);
        Self {
            conn,
            availability,
            ledger,
            resolver,
        }
    }

    pub fn availability(&self) -> &AvailabilityStore {
        &self.availability
    }

    pub fn ledger(&self) -> &SqliteLedger {
        &self.ledger
    }

    pub fn resolver(&self) -> &SlotResolver {
        &self.resolver
    }

    /// Quick liveness check: the connection lock is healthy and answers a query.
    pub fn database_ready(&self) -> bool {
        db::lock(&self.conn)
            .and_then(|conn| Ok(conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?))
            .is_ok()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Cannot prepare data directory: {0}")]
    DataDir(String),
}
