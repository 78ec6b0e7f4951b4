//! Builder for creating and configuring Engine instances.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use jiff::tz::TimeZone;
use log::debug;
use tokio::task;

use super::Engine;
use crate::{
    access::AccessControl,
    clock::{SystemClock, TimeSource},
    db::SqliteRepository,
    error::{InspectionError, Result},
    store::Repository,
};

/// Builder for creating and configuring Engine instances.
#[derive(Clone, Default)]
pub struct EngineBuilder {
    database_path: Option<PathBuf>,
    time_zone: Option<TimeZone>,
    clock: Option<Arc<dyn TimeSource>>,
    access: Option<Arc<dyn AccessControl>>,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/patrol/patrol.db` or `~/.local/share/patrol/patrol.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Time zone used to read calendar days. Defaults to the system zone.
    /// Ignored when an explicit clock is supplied.
    pub fn with_time_zone(mut self, time_zone: TimeZone) -> Self {
        self.time_zone = Some(time_zone);
        self
    }

    /// Replaces the wall clock, typically with a
    /// [`FixedClock`](crate::clock::FixedClock) in tests.
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Replaces the membership check that otherwise comes from the
    /// repository.
    pub fn with_access_control(mut self, access: Arc<dyn AccessControl>) -> Self {
        self.access = Some(access);
        self
    }

    /// Builds an engine over the configured SQLite database.
    ///
    /// # Errors
    ///
    /// Returns `InspectionError::FileSystem` if the database directory cannot
    /// be created
    /// Returns `InspectionError::Database` if database initialization fails
    pub async fn build(self) -> Result<Engine<SqliteRepository>> {
        let db_path = match self.database_path.clone() {
            Some(path) => path,
            None => Self::default_database_path()?,
        };

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| InspectionError::FileSystem {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        debug!("Opening database at {}", db_path.display());
        let repository = task::spawn_blocking(move || SqliteRepository::open(&db_path))
            .await
            .map_err(|e| InspectionError::Configuration {
                message: format!("Task join error: {e}"),
            })??;

        Ok(self.build_with_repository(Arc::new(repository)))
    }

    /// Builds an engine over an already constructed repository, which also
    /// answers access checks unless one was configured.
    pub fn build_with_repository<R>(self, repository: Arc<R>) -> Engine<R>
    where
        R: Repository + AccessControl,
    {
        let clock = match (self.clock, self.time_zone) {
            (Some(clock), _) => clock,
            (None, Some(time_zone)) => Arc::new(SystemClock::new(time_zone)),
            (None, None) => Arc::new(SystemClock::default()),
        };
        let access = match self.access {
            Some(access) => access,
            None => Arc::clone(&repository) as Arc<dyn AccessControl>,
        };

        Engine::new(repository, clock, access)
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("patrol")
            .place_data_file("patrol.db")
            .map_err(|e| InspectionError::XdgDirectory(e.to_string()))
    }
}
