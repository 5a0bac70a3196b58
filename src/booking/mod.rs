//! Booking service
//!
//! Room inventory and reservation storage for the hotel, backed by `SQLite`.
//! Every operation returns a structured JSON payload with an explicit
//! success flag or error string, ready to hand back to the model as a tool
//! result.

mod schema;
mod store;

use std::path::Path;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

use crate::{Error, Result};

pub use schema::SCHEMA_VERSION;
pub use store::{BookRoomRequest, Booking, BookingStore, LookupQuery, UpdateBookingRequest};

/// Database connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

/// Pooled database connection
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Initialize the booking database
///
/// # Errors
///
/// Returns error if the database cannot be opened or migrated.
pub fn init<P: AsRef<Path>>(path: P) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(path);
    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .map_err(|e| Error::Database(e.to_string()))?;

    let conn = pool.get().map_err(|e| Error::Database(e.to_string()))?;
    schema::init(&conn)?;

    tracing::info!(version = SCHEMA_VERSION, "booking database initialized");
    Ok(pool)
}

/// Initialize an in-memory booking database (for testing)
///
/// # Errors
///
/// Returns error if the database cannot be initialized.
pub fn init_memory() -> Result<DbPool> {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder()
        .max_size(1)
        .build(manager)
        .map_err(|e| Error::Database(e.to_string()))?;

    let conn = pool.get().map_err(|e| Error::Database(e.to_string()))?;
    schema::init(&conn)?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_memory_creates_schema() {
        let pool = init_memory().expect("init");
        let conn = pool.get().expect("conn");
        let rooms: i64 = conn
            .query_row("SELECT COUNT(*) FROM rooms", [], |row| row.get(0))
            .expect("rooms table");
        assert_eq!(rooms, 0);
    }
}
