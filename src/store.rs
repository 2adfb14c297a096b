// src/store.rs
use crate::dates::parse_date_key;
use crate::model::WorkoutLog;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Slot the whole log is persisted under.
pub const LOG_STORAGE_KEY: &str = "fittrack_log_v1";

const DB_FILE_NAME: &str = "fittrack.sqlite";
const APP_DATA_DIR: &str = "fittrack";

// Custom Error type for store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database connection failed")]
    Connection(#[from] rusqlite::Error),
    #[error("Failed to get application data directory")]
    DataDir,
    #[error("I/O error accessing database file")]
    Io(#[from] std::io::Error),
    #[error("Database query failed: {0}")]
    QueryFailed(rusqlite::Error),
    #[error("Database write failed: {0}")]
    WriteFailed(rusqlite::Error),
    #[error("Failed to serialize workout log: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Opaque key-value persistence for string blobs.
pub trait BlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Gets the path to the SQLite database file within the app's data directory.
/// Creates the directory if it doesn't exist.
pub fn get_db_path() -> Result<PathBuf, StoreError> {
    let data_dir = dirs::data_dir().ok_or(StoreError::DataDir)?;
    let app_dir = data_dir.join(APP_DATA_DIR);
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir.join(DB_FILE_NAME))
}

/// Blob store backed by a single SQLite table.
pub struct SqliteBlobStore {
    conn: Connection,
}

impl SqliteBlobStore {
    /// Opens (or creates) the database file and ensures the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(StoreError::Connection)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::Connection)?;
        Self::from_connection(conn)
    }

    pub fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        init_db(&conn)?;
        Ok(Self { conn })
    }
}

/// Initializes the blob table if it doesn't exist.
pub fn init_db(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS blobs (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL
        )",
        [],
    )
    .map_err(StoreError::Connection)?;
    Ok(())
}

impl BlobStore for SqliteBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.conn
            .query_row("SELECT value FROM blobs WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(StoreError::QueryFailed)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO blobs (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(StoreError::WriteFailed)?;
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ShapeError {
    #[error("not valid log JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("'{0}' is not a canonical YYYY-MM-DD date key")]
    DateKey(String),
    #[error("exercise on {0} has an empty name")]
    EmptyName(String),
    #[error("set on {date} has invalid weight {weight}")]
    Weight { date: String, weight: f64 },
}

/// Decodes a stored blob and checks it has the shape the rest of the
/// crate relies on.
pub fn parse_log(blob: &str) -> Result<WorkoutLog, ShapeError> {
    let log: WorkoutLog = serde_json::from_str(blob)?;
    for (date, exercises) in &log {
        if parse_date_key(date).is_none() {
            return Err(ShapeError::DateKey(date.clone()));
        }
        for exercise in exercises {
            if exercise.name.trim().is_empty() {
                return Err(ShapeError::EmptyName(date.clone()));
            }
            if let Some(bad) = exercise
                .sets
                .iter()
                .find(|s| !s.weight.is_finite() || s.weight < 0.0)
            {
                return Err(ShapeError::Weight {
                    date: date.clone(),
                    weight: bad.weight,
                });
            }
        }
    }
    Ok(log)
}

/// Holds the current log and writes the whole of it through to a blob store.
pub struct LogStore<B: BlobStore> {
    blobs: B,
    current: WorkoutLog,
}

impl<B: BlobStore> LogStore<B> {
    /// Wraps `blobs` and loads the persisted log.
    pub fn open(blobs: B) -> Self {
        let mut store = Self {
            blobs,
            current: WorkoutLog::new(),
        };
        store.current = store.load();
        store
    }

    /// Reads the persisted log. Absent, unreadable or malformed blobs all
    /// yield an empty log.
    pub fn load(&self) -> WorkoutLog {
        let blob = match self.blobs.get(LOG_STORAGE_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                debug!("No stored workout log, starting empty");
                return WorkoutLog::new();
            }
            Err(e) => {
                warn!("Failed to read stored workout log: {e}");
                return WorkoutLog::new();
            }
        };
        match parse_log(&blob) {
            Ok(log) => {
                debug!("Loaded workout log with {} dates", log.len());
                log
            }
            Err(e) => {
                warn!("Discarding stored workout log: {e}");
                WorkoutLog::new()
            }
        }
    }

    /// Serializes and writes the full log, then makes it the current value.
    pub fn save(&mut self, log: WorkoutLog) -> Result<(), StoreError> {
        let blob = serde_json::to_string(&log)?;
        self.blobs.set(LOG_STORAGE_KEY, &blob)?;
        info!("Saved workout log ({} dates)", log.len());
        self.current = log;
        Ok(())
    }

    pub fn current(&self) -> &WorkoutLog {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityId, Exercise, WorkoutSet};

    fn store() -> LogStore<SqliteBlobStore> {
        LogStore::open(SqliteBlobStore::open_in_memory().unwrap())
    }

    fn sample_log() -> WorkoutLog {
        let mut log = WorkoutLog::new();
        log.insert(
            "2024-05-01".into(),
            vec![Exercise {
                id: EntityId::from("ex-1"),
                name: "Squat".into(),
                sets: vec![
                    WorkoutSet {
                        id: EntityId::from("s-1"),
                        reps: 10,
                        weight: 60.0,
                    },
                    WorkoutSet {
                        id: EntityId::from("s-2"),
                        reps: 8,
                        weight: 62.5,
                    },
                ],
            }],
        );
        log
    }

    #[test]
    fn test_load_absent_is_empty() {
        assert!(store().load().is_empty());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let mut store = store();
        store.save(sample_log()).unwrap();
        assert_eq!(store.current(), &sample_log());
        assert_eq!(store.load(), sample_log());
    }

    #[test]
    fn test_save_overwrites_previous_blob() {
        let mut store = store();
        store.save(sample_log()).unwrap();
        store.save(WorkoutLog::new()).unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_malformed_blobs_fall_back_to_empty() {
        for blob in [
            "not json at all",
            "[1, 2, 3]",
            r#"{"2024-05-01": "Squat"}"#,
            r#"{"2024-05-01": [{"id": "a", "name": "Squat", "sets": [{"id": "s", "reps": "10", "weight": 60}]}]}"#,
            r#"{"2024-5-1": []}"#,
            r#"{"2024-05-01": [{"id": "a", "name": " ", "sets": []}]}"#,
            r#"{"2024-05-01": [{"id": "a", "name": "Squat", "sets": [{"id": "s", "reps": 5, "weight": -3}]}]}"#,
        ] {
            let mut blobs = SqliteBlobStore::open_in_memory().unwrap();
            blobs.set(LOG_STORAGE_KEY, blob).unwrap();
            let store = LogStore::open(blobs);
            assert!(store.current().is_empty(), "blob should be rejected: {blob}");
        }
    }

    #[test]
    fn test_parse_log_accepts_legacy_ids() {
        let blob = r#"{"2024-05-01": [{"id": "1714550000000", "name": "Squat",
            "sets": [{"id": "1714550000000-s1", "reps": 10, "weight": 0}]}]}"#;
        let log = parse_log(blob).unwrap();
        assert_eq!(log["2024-05-01"][0].id, EntityId::from("1714550000000"));
    }
}
