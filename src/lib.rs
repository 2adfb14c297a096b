use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

// --- Declare modules ---
pub mod advice;
mod config;
pub mod dates;
pub mod editor;
pub mod model;
pub mod stats;
pub mod store;

// --- Expose public types ---
pub use advice::{GeminiClient, TextGenerator};
pub use config::{
    get_config_path as get_config_path_util, load as load_config_util, parse_color,
    save as save_config_util, Config, ConfigError, StandardColor, Theme, Units,
};
pub use dates::{date_key, parse_date_key, today_key};
pub use editor::{EditError, SetField, WorkoutDraft};
pub use model::{EntityId, Exercise, WorkoutLog, WorkoutSet};
pub use stats::DayStats;
pub use store::{BlobStore, LogStore, SqliteBlobStore, StoreError};

/// Owns the configuration, the log store and the advice collaborator, and
/// exposes the operations the front end needs.
pub struct AppService<B: BlobStore = SqliteBlobStore> {
    pub config: Config,
    pub config_path: PathBuf,
    pub db_path: PathBuf,
    store: LogStore<B>,
    advisor: Arc<dyn TextGenerator>,
}

impl AppService<SqliteBlobStore> {
    /// Initializes the application service.
    /// # Errors
    /// Returns `anyhow::Error` if config/db path determination, loading, or initialization fails.
    pub fn initialize() -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let config = config::load(&config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"))?;

        let db_path = store::get_db_path().context("Failed to determine database path")?;
        let blobs = SqliteBlobStore::open(&db_path)
            .with_context(|| format!("Failed to open database at {db_path:?}"))?;

        let advisor = Arc::new(GeminiClient::from_config(&config));
        Ok(Self::new(config, config_path, db_path, blobs, advisor))
    }
}

impl<B: BlobStore> AppService<B> {
    /// Builds a service over explicit collaborators; loads the log from `blobs`.
    pub fn new(
        config: Config,
        config_path: PathBuf,
        db_path: PathBuf,
        blobs: B,
        advisor: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            config,
            config_path,
            db_path,
            store: LogStore::open(blobs),
            advisor,
        }
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    /// Saves the current configuration state.
    /// # Errors
    /// Returns `ConfigError` if saving fails.
    pub fn save_config(&self) -> Result<(), ConfigError> {
        config::save(&self.config_path, &self.config)
    }

    /// Stores the Gemini key (or clears it with `None`) and rebuilds the
    /// Gemini client from the updated configuration.
    /// # Errors
    /// Returns `ConfigError` if saving fails.
    pub fn set_api_key(&mut self, key: Option<String>) -> Result<(), ConfigError> {
        self.config.gemini_api_key = key.filter(|k| !k.trim().is_empty());
        self.save_config()?;
        self.advisor = Arc::new(GeminiClient::from_config(&self.config));
        Ok(())
    }

    /// Current snapshot of the whole log.
    pub fn log(&self) -> &WorkoutLog {
        self.store.current()
    }

    /// Exercises logged on `date`, empty if none.
    pub fn exercises_for(&self, date: NaiveDate) -> &[Exercise] {
        self.log()
            .get(&date_key(date))
            .map_or(&[][..], Vec::as_slice)
    }

    /// Editable copy of `date`'s exercises.
    pub fn draft_for(&self, date: NaiveDate) -> WorkoutDraft {
        WorkoutDraft::new(self.exercises_for(date).to_vec())
    }

    /// Replaces `date`'s exercises and persists the whole log.
    /// # Errors
    /// Returns an error if writing to the store fails.
    pub fn save_date(&mut self, date: NaiveDate, exercises: Vec<Exercise>) -> Result<()> {
        let key = date_key(date);
        let count = exercises.len();
        let next = model::set_exercises_for_date(self.log(), &key, exercises);
        self.store
            .save(next)
            .with_context(|| format!("Failed to save workout for {key}"))?;
        info!("Saved {count} exercise(s) for {key}");
        Ok(())
    }

    /// Appends copies of `source`'s exercises to `target` and persists.
    /// Returns how many exercises were copied.
    /// # Errors
    /// Returns an error if writing to the store fails.
    pub fn copy_date(&mut self, source: NaiveDate, target: NaiveDate) -> Result<usize> {
        let (from, to) = (date_key(source), date_key(target));
        let copied = self.log().get(&from).map_or(0, Vec::len);
        let next = model::copy_date(self.log(), &from, &to);
        self.store
            .save(next)
            .with_context(|| format!("Failed to copy workout from {from} to {to}"))?;
        info!("Copied {copied} exercise(s) from {from} to {to}");
        Ok(copied)
    }

    /// Coaching text for `date` based on the recent log. The history is read
    /// now; the returned future borrows nothing from the service, so saves may
    /// happen while it is pending. Never fails.
    pub fn request_advice(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = String> + Send + 'static {
        advice::request_advice(
            Arc::clone(&self.advisor),
            self.log(),
            &date_key(date),
            self.config.summary_days,
        )
    }

    pub fn has_workout(&self, date: NaiveDate) -> bool {
        stats::has_workout(self.log(), date)
    }

    pub fn total_workout_days(&self) -> usize {
        stats::total_workout_days(self.log())
    }

    /// Seven days of totals ending at `today`.
    pub fn weekly_stats(&self, today: NaiveDate) -> Vec<DayStats> {
        stats::weekly_stats_from(self.log(), today)
    }

    pub fn month_overview(&self, year: i32, month: u32) -> Vec<(NaiveDate, bool)> {
        stats::month_overview(self.log(), year, month)
    }

    pub fn recent_summary(&self) -> String {
        stats::recent_summary_text(self.log(), self.config.summary_days)
    }
}
