//! Storage layer for khoj.
//!
//! [`Storage`] owns one `SQLite` connection. Every component borrows it for
//! the duration of an operation; nothing in the crate holds a global handle.
//! Records are keyed by auto-incrementing integer ids.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::complaint::ComplaintKind;
use crate::error::{Error, Result};

/// Storage engine backed by `SQLite`.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // Several sessions may read while one writes.
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside a transaction.
    ///
    /// The transaction commits only if `f` returns `Ok`; on error, or if the
    /// closure panics, every write made through the handle is rolled back.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a database error if the transaction
    /// cannot be started or committed.
    pub fn with_transaction<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Count rows in a complaint table.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_complaints(&self, kind: ComplaintKind) -> Result<i64> {
        self.count_rows(kind.as_str())
    }

    fn count_rows(&self, table: &str) -> Result<i64> {
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })?;
        Ok(count)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let mut complaints = Vec::with_capacity(ComplaintKind::ALL.len());
        for kind in ComplaintKind::ALL {
            complaints.push((kind, self.count_complaints(kind)?));
        }

        let newest: Option<String> = self
            .conn
            .query_row(
                r"
                SELECT MAX(created_at) FROM (
                    SELECT created_at FROM lost_found
                    UNION ALL SELECT created_at FROM medical_assistance
                    UNION ALL SELECT created_at FROM womens_safety
                )
                ",
                [],
                |row| row.get(0),
            )
            .optional()?
            .flatten();

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map_or(0, |m| m.len())
        };

        Ok(StorageStats {
            users: self.count_rows("users")?,
            complaints,
            volunteer_assignments: self.count_rows("volunteer_assignments")?,
            companion_requests: self.count_rows("travel_companions")?,
            newest_complaint: newest.as_deref().and_then(|s| parse_timestamp(s).ok()),
            db_size_bytes,
        })
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StorageStats {
    /// Registered user profiles.
    pub users: i64,
    /// Complaint count per kind.
    pub complaints: Vec<(ComplaintKind, i64)>,
    /// Recorded volunteer claims.
    pub volunteer_assignments: i64,
    /// Travel companion requests.
    pub companion_requests: i64,
    /// When the most recent complaint was filed.
    pub newest_complaint: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

impl StorageStats {
    /// Total complaints across all kinds.
    #[must_use]
    pub fn total_complaints(&self) -> i64 {
        self.complaints.iter().map(|(_, n)| n).sum()
    }
}

/// Current time at the precision timestamps are stored with.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

// Fixed-width timestamps so that text ordering matches time ordering.
pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(value: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Wrap a parse failure for column `idx` in the error `rusqlite` row mappers expect.
pub(crate) fn conversion_error(
    idx: usize,
    message: impl Into<String>,
) -> rusqlite::Error {
    let message: String = message.into();
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

/// Read an RFC 3339 timestamp column.
pub(crate) fn timestamp_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw).map_err(|e| conversion_error(idx, format!("bad timestamp '{raw}': {e}")))
}

/// Read a `YYYY-MM-DD` date column.
pub(crate) fn date_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|e| conversion_error(idx, format!("bad date '{raw}': {e}")))
}

/// Read an `HH:MM` time column.
pub(crate) fn time_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveTime> {
    let raw: String = row.get(idx)?;
    NaiveTime::parse_from_str(&raw, "%H:%M")
        .map_err(|e| conversion_error(idx, format!("bad time '{raw}': {e}")))
}
