pub mod migrations;
pub mod queries;

use std::sync::Mutex;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::{Booking, ValidBooking};

/// Connection state as reported by `/health` and `/api/db-status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbStatus {
    Disconnected,
    Connected,
}

impl DbStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DbStatus::Disconnected => "disconnected",
            DbStatus::Connected => "connected",
        }
    }
}

/// Every read and write of stored bookings goes through this trait.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Persists a validated booking and returns it with its generated id
    /// and timestamps.
    async fn insert(&self, booking: ValidBooking) -> anyhow::Result<Booking>;

    /// Returns every booking sorted by date, then time.
    async fn find_all(&self) -> anyhow::Result<Vec<Booking>>;

    async fn status(&self) -> DbStatus;
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database connection lock poisoned"))
    }
}

#[async_trait]
impl BookingStore for SqliteStore {
    async fn insert(&self, booking: ValidBooking) -> anyhow::Result<Booking> {
        let now = Utc::now().trunc_subsecs(3);
        let booking = Booking {
            id: Uuid::new_v4().to_string(),
            name: booking.name,
            email: booking.email,
            date: booking.date,
            time: booking.time,
            service_type: booking.service_type,
            notes: booking.notes,
            created_at: now,
            updated_at: now,
        };

        let db = self.lock()?;
        queries::insert_booking(&db, &booking).context("failed to insert booking")?;
        Ok(booking)
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Booking>> {
        let db = self.lock()?;
        queries::get_all_bookings(&db).context("failed to load bookings")
    }

    async fn status(&self) -> DbStatus {
        match self.lock().and_then(|db| queries::ping(&db)) {
            Ok(()) => DbStatus::Connected,
            Err(e) => {
                tracing::warn!(error = %e, "database ping failed");
                DbStatus::Disconnected
            }
        }
    }
}

pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path).context("failed to open database")?;

    conn.execute_batch("PRAGMA journal_mode=WAL;")
        .context("failed to set database pragmas")?;

    migrations::run_migrations(&conn)?;

    Ok(conn)
}

/// Opens the store named by `uri` (`sqlite://path`, a plain path, or `:memory:`).
///
/// Fails if `uri` is empty or the database cannot be opened and migrated.
pub fn connect(uri: &str) -> anyhow::Result<SqliteStore> {
    let uri = uri.trim();
    anyhow::ensure!(!uri.is_empty(), "DATABASE_URL is not defined");

    let path = uri.strip_prefix("sqlite://").unwrap_or(uri);
    tracing::info!("connecting to database: {path}");

    let conn = init_db(path).with_context(|| format!("database connection failed: {path}"))?;

    tracing::info!("database connected");
    Ok(SqliteStore::new(conn))
}
