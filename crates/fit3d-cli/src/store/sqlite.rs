//! SQLite-backed health-record store
//!
//! Persists samples and per-kind authorization state in a local database.
//! Timestamps are stored as epoch milliseconds so the duplicate check's
//! exact-equality comparison survives the round trip.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Fit3dError, Result};
use crate::store::{AuthorizationStatus, HealthStore, MetricKind, Sample, SaveError, Unit};

/// SQLite database holding the local health records
pub struct SqliteHealthStore {
    conn: Mutex<Connection>,
}

impl SqliteHealthStore {
    /// Open or create the health store database
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| Fit3dError::store(format!("Failed to open health store: {}", e)))?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Fit3dError::store(format!("Failed to open in-memory store: {}", e)))?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Run migrations
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS samples (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL,
                value REAL NOT NULL,
                unit TEXT NOT NULL,
                start_ts INTEGER NOT NULL,
                end_ts INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_samples_kind_start
            ON samples(kind, start_ts DESC);

            CREATE TABLE IF NOT EXISTS authorization (
                kind TEXT PRIMARY KEY,
                status TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| Fit3dError::store(format!("Failed to run migrations: {}", e)))?;

        Ok(())
    }

    fn status_of(conn: &Connection, kind: MetricKind) -> AuthorizationStatus {
        conn.query_row(
            "SELECT status FROM authorization WHERE kind = ?",
            params![kind.as_str()],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .ok()
        .flatten()
        .and_then(|s| AuthorizationStatus::parse(&s))
        .unwrap_or(AuthorizationStatus::NotDetermined)
    }

    fn set_status(conn: &Connection, kind: MetricKind, status: AuthorizationStatus) -> Result<()> {
        conn.execute(
            "INSERT INTO authorization (kind, status) VALUES (?, ?)
             ON CONFLICT (kind) DO UPDATE SET status = excluded.status",
            params![kind.as_str(), status.as_str()],
        )
        .map_err(|e| Fit3dError::store(format!("Failed to update authorization: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl HealthStore for SqliteHealthStore {
    async fn request_authorization(
        &self,
        kinds: &[MetricKind],
        _read: bool,
        _write: bool,
    ) -> Result<bool> {
        let conn = self.conn.lock().unwrap();

        // A local store has no user to prompt: undetermined kinds become
        // authorized, previously recorded denials stand.
        for &kind in kinds {
            if Self::status_of(&conn, kind) == AuthorizationStatus::NotDetermined {
                Self::set_status(&conn, kind, AuthorizationStatus::Authorized)?;
            }
        }

        Ok(true)
    }

    fn authorization_status(&self, kind: MetricKind) -> AuthorizationStatus {
        let conn = self.conn.lock().unwrap();
        Self::status_of(&conn, kind)
    }

    async fn query(
        &self,
        kind: MetricKind,
        starting_at: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Sample>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT value, unit, start_ts, end_ts FROM samples
                 WHERE kind = ? AND start_ts >= ?
                 ORDER BY start_ts DESC
                 LIMIT ?",
            )
            .map_err(|e| Fit3dError::store(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(
                params![kind.as_str(), starting_at.timestamp_millis(), limit as i64],
                |row| {
                    let value: f64 = row.get(0)?;
                    let unit: String = row.get(1)?;
                    let start_ts: i64 = row.get(2)?;
                    let end_ts: i64 = row.get(3)?;
                    Ok((value, unit, start_ts, end_ts))
                },
            )
            .map_err(|e| Fit3dError::store(format!("Failed to query samples: {}", e)))?;

        let mut samples = Vec::new();
        for row in rows {
            let (value, unit, start_ts, end_ts) =
                row.map_err(|e| Fit3dError::store(format!("Failed to read sample: {}", e)))?;

            let unit = Unit::parse(&unit)
                .ok_or_else(|| Fit3dError::store(format!("Unknown unit in store: {}", unit)))?;
            let start = DateTime::from_timestamp_millis(start_ts)
                .ok_or_else(|| Fit3dError::store("Invalid sample timestamp".to_string()))?;
            let end = DateTime::from_timestamp_millis(end_ts)
                .ok_or_else(|| Fit3dError::store("Invalid sample timestamp".to_string()))?;

            samples.push(Sample {
                kind,
                value,
                unit,
                start,
                end,
            });
        }

        Ok(samples)
    }

    async fn save(&self, sample: Sample) -> std::result::Result<(), SaveError> {
        let conn = self.conn.lock().unwrap();

        if Self::status_of(&conn, sample.kind) != AuthorizationStatus::Authorized {
            return Err(SaveError::PermissionDenied);
        }

        // Refuse a byte-identical duplicate row outright
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM samples
                 WHERE kind = ? AND value = ? AND unit = ? AND start_ts = ?",
                params![
                    sample.kind.as_str(),
                    sample.value,
                    sample.unit.as_str(),
                    sample.start.timestamp_millis()
                ],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| SaveError::Other(e.to_string()))?;

        if existing.is_some() {
            return Err(SaveError::AlreadyExists);
        }

        conn.execute(
            "INSERT INTO samples (kind, value, unit, start_ts, end_ts)
             VALUES (?, ?, ?, ?, ?)",
            params![
                sample.kind.as_str(),
                sample.value,
                sample.unit.as_str(),
                sample.start.timestamp_millis(),
                sample.end.timestamp_millis()
            ],
        )
        .map_err(|e| SaveError::Other(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn setup() -> SqliteHealthStore {
        SqliteHealthStore::open_in_memory().unwrap()
    }

    fn date(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    #[tokio::test]
    async fn test_authorization_defaults_to_not_determined() {
        let store = setup();
        assert_eq!(
            store.authorization_status(MetricKind::BodyMass),
            AuthorizationStatus::NotDetermined
        );
    }

    #[tokio::test]
    async fn test_request_authorization_promotes_undetermined() {
        let store = setup();
        let granted = store
            .request_authorization(&[MetricKind::BodyMass, MetricKind::Height], true, true)
            .await
            .unwrap();

        assert!(granted);
        assert_eq!(
            store.authorization_status(MetricKind::BodyMass),
            AuthorizationStatus::Authorized
        );
        assert_eq!(
            store.authorization_status(MetricKind::Height),
            AuthorizationStatus::Authorized
        );
    }

    #[tokio::test]
    async fn test_request_authorization_preserves_denials() {
        let store = setup();
        {
            let conn = store.conn.lock().unwrap();
            SqliteHealthStore::set_status(&conn, MetricKind::BodyMass, AuthorizationStatus::Denied)
                .unwrap();
        }

        store
            .request_authorization(&[MetricKind::BodyMass], true, true)
            .await
            .unwrap();

        assert_eq!(
            store.authorization_status(MetricKind::BodyMass),
            AuthorizationStatus::Denied
        );
    }

    #[tokio::test]
    async fn test_save_requires_authorization() {
        let store = setup();
        let sample = Sample::point(MetricKind::BodyMass, 172.0, Unit::Pound, date(1_000_000));

        let result = store.save(sample).await;
        assert_eq!(result, Err(SaveError::PermissionDenied));
    }

    #[tokio::test]
    async fn test_save_and_query_round_trip() {
        let store = setup();
        store
            .request_authorization(&[MetricKind::BodyMass], true, true)
            .await
            .unwrap();

        let sample = Sample::point(MetricKind::BodyMass, 172.25, Unit::Pound, date(1_528_000_123));
        store.save(sample.clone()).await.unwrap();

        let found = store
            .query(MetricKind::BodyMass, date(1_528_000_123), 10)
            .await
            .unwrap();
        assert_eq!(found, vec![sample]);
    }

    #[tokio::test]
    async fn test_query_is_most_recent_first() {
        let store = setup();
        store
            .request_authorization(&[MetricKind::BodyMass], true, true)
            .await
            .unwrap();

        for millis in [1_000, 3_000, 2_000] {
            store
                .save(Sample::point(
                    MetricKind::BodyMass,
                    170.0 + millis as f64,
                    Unit::Pound,
                    date(millis),
                ))
                .await
                .unwrap();
        }

        let found = store.query(MetricKind::BodyMass, date(0), 10).await.unwrap();
        let starts: Vec<i64> = found.iter().map(|s| s.start.timestamp_millis()).collect();
        assert_eq!(starts, vec![3_000, 2_000, 1_000]);
    }

    #[tokio::test]
    async fn test_query_excludes_earlier_samples() {
        let store = setup();
        store
            .request_authorization(&[MetricKind::BodyMass], true, true)
            .await
            .unwrap();

        store
            .save(Sample::point(MetricKind::BodyMass, 170.0, Unit::Pound, date(1_000)))
            .await
            .unwrap();
        store
            .save(Sample::point(MetricKind::BodyMass, 171.0, Unit::Pound, date(2_000)))
            .await
            .unwrap();

        let found = store
            .query(MetricKind::BodyMass, date(1_500), 10)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, 171.0);
    }

    #[tokio::test]
    async fn test_save_refuses_identical_duplicate() {
        let store = setup();
        store
            .request_authorization(&[MetricKind::BodyMass], true, true)
            .await
            .unwrap();

        let sample = Sample::point(MetricKind::BodyMass, 172.0, Unit::Pound, date(1_000));
        store.save(sample.clone()).await.unwrap();

        let result = store.save(sample).await;
        assert_eq!(result, Err(SaveError::AlreadyExists));
    }

    #[tokio::test]
    async fn test_timestamp_millis_survive_round_trip() {
        let store = setup();
        store
            .request_authorization(&[MetricKind::Height], true, true)
            .await
            .unwrap();

        let precise = date(1_528_000_123);
        store
            .save(Sample::point(MetricKind::Height, 70.5, Unit::Inch, precise))
            .await
            .unwrap();

        let found = store.query(MetricKind::Height, precise, 10).await.unwrap();
        assert_eq!(found[0].start, precise);
    }
}
