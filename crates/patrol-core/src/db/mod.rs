//! SQLite persistence for plans, orders, checks and routes.
//!
//! [`Database`] owns a connection and the schema. Work happens inside a
//! [`Session`], an IMMEDIATE transaction that implements every store trait
//! from [`crate::store`]. IMMEDIATE takes the write lock up front, so two
//! sessions touching the same order are serialized by SQLite itself; the
//! busy timeout makes the second one wait instead of failing.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

use self::directory_queries::{user_from_row, SELECT_USER_SQL};
use crate::{
    access::{project_access, AccessControl},
    error::{DatabaseResultExt, Result},
    store::{Repository, Store},
};

pub mod directory_queries;
pub mod item_queries;
pub mod migrations;
pub mod order_queries;
pub mod plan_queries;
pub mod route_queries;
pub mod utils;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .db_context("Failed to set busy timeout")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Begins a unit of work holding the database write lock.
    pub fn session(&mut self) -> Result<Session<'_>> {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;
        Ok(Session { tx })
    }
}

/// One open transaction. Dropping it without [`Session::commit`] rolls back.
pub struct Session<'conn> {
    pub(crate) tx: Transaction<'conn>,
}

impl Session<'_> {
    pub fn commit(self) -> Result<()> {
        self.tx.commit().db_context("Failed to commit transaction")
    }
}

/// Repository over a database file, opening one connection per unit of
/// work.
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    db_path: PathBuf,
}

impl SqliteRepository {
    /// Opens (and if needed creates) the database once to validate the path
    /// and apply the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        Database::new(&db_path)?;
        Ok(Self { db_path })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

impl Repository for SqliteRepository {
    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Store) -> Result<T>,
    {
        let mut db = Database::new(&self.db_path)?;
        let mut session = db.session()?;
        let value = f(&mut session)?;
        session.commit()?;
        Ok(value)
    }
}

impl AccessControl for SqliteRepository {
    fn has_project_access(&self, subject_id: u64, project_id: u64) -> Result<bool> {
        let db = Database::new(&self.db_path)?;
        let user = db
            .connection
            .query_row(SELECT_USER_SQL, params![subject_id as i64], user_from_row)
            .optional()
            .db_context("Failed to look up user")?;
        Ok(project_access(user.as_ref(), project_id))
    }
}
