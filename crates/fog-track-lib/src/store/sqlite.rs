//! Durable sample store on SQLite

use super::SampleStore;
use crate::sample::Fix;
use crate::{BoundingBox, Result, Sample, SampleId, TrackError};
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Newest schema this code knows how to read and write
pub const SCHEMA_VERSION: i64 = 1;

// AUTOINCREMENT keeps ids strictly increasing even if rows are ever removed by hand.
const CREATE_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS locations (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        datetime  INTEGER NOT NULL,
        latitude  REAL    NOT NULL,
        longitude REAL    NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_locations_lat_lon ON locations (latitude, longitude);
";

const INSERT_SAMPLE: &str =
    "INSERT INTO locations (datetime, latitude, longitude) VALUES (?1, ?2, ?3)";

const SELECT_IN_WINDOW: &str = "
    SELECT id, datetime, latitude, longitude
    FROM locations
    WHERE latitude >= ?1 AND latitude <= ?2 AND longitude >= ?3 AND longitude <= ?4
    ORDER BY datetime ASC, id ASC
";

/// Single-table SQLite store
///
/// Every insert is committed before it returns. The connection sits behind a mutex, so a
/// query and an insert never interleave.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl SqliteStore {
    /// Open (or create) a database file and bring its schema up to date
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        tracing::debug!("Opened sample database at {}", path.as_ref().display());
        Self::with_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "synchronous", "FULL")?;
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Schema version recorded in the database
    pub fn schema_version(&self) -> Result<i64> {
        let conn = self.lock()?;
        schema_version(&conn)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| TrackError::LockPoisoned("sqlite connection"))
    }
}

fn schema_version(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

fn migrate(conn: &Connection) -> Result<()> {
    let current = schema_version(conn)?;
    if current > SCHEMA_VERSION {
        return Err(TrackError::UnsupportedSchema {
            found: current,
            supported: SCHEMA_VERSION,
        });
    }

    if current < 1 {
        conn.execute_batch(CREATE_SCHEMA)?;
        conn.pragma_update(None, "user_version", 1)?;
        tracing::info!("Created sample database schema (version 1)");
    }

    Ok(())
}

impl SampleStore for SqliteStore {
    fn insert(&self, latitude: f64, longitude: f64, timestamp_ms: i64) -> Result<SampleId> {
        let conn = self.lock()?;
        conn.prepare_cached(INSERT_SAMPLE)?
            .execute(params![timestamp_ms, latitude, longitude])?;
        Ok(SampleId(conn.last_insert_rowid()))
    }

    fn insert_many(&self, fixes: &[Fix]) -> Result<Vec<SampleId>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut ids = Vec::with_capacity(fixes.len());
        {
            let mut statement = tx.prepare_cached(INSERT_SAMPLE)?;
            for fix in fixes {
                statement.execute(params![fix.timestamp_ms, fix.latitude, fix.longitude])?;
                ids.push(SampleId(tx.last_insert_rowid()));
            }
        }

        // Dropping the transaction on an early return above rolls everything back
        tx.commit()?;
        Ok(ids)
    }

    fn query_range(&self, bbox: &BoundingBox) -> Result<Vec<Sample>> {
        #[cfg(feature = "profiling")]
        profiling::scope!("sqlite_store::query_range");

        let conn = self.lock()?;
        let mut statement = conn.prepare_cached(SELECT_IN_WINDOW)?;
        let rows = statement.query_map(
            params![bbox.min_lat(), bbox.max_lat(), bbox.min_lon(), bbox.max_lon()],
            |row| {
                Ok(Sample::new(
                    SampleId(row.get(0)?),
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                ))
            },
        )?;
        let found = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        tracing::debug!("SQLite store query matched {} samples", found.len());
        Ok(found)
    }

    fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM locations", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
