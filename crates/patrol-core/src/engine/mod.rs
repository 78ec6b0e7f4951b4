//! Inspection workflow engine.
//!
//! [`Engine`] is the entry point for every operator action and for the
//! periodic sweep. It owns no database handle; it is given a
//! [`Repository`], a [`TimeSource`] and an [`AccessControl`] at construction
//! and runs each operation as a single unit of work on the blocking pool.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   Operations    │    │  Domain rules   │    │   Repository    │
//! │ (plan_ops,      │───▶│ (trigger,       │───▶│ (atomically:    │
//! │  order_ops,     │    │  factory,       │    │  SQLite or      │
//! │  sweep)         │    │  lifecycle)     │    │  memory)        │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: [`EngineBuilder`], database path and clock configuration
//! - [`trigger`]: whether a plan fires at a given instant
//! - [`factory`]: turns a fired plan into an order plus its checks
//! - [`lifecycle`]: order state transitions and their guards
//! - [`sweep`]: one pass over all plans
//! - [`plan_ops`], [`order_ops`], [`directory_ops`], [`item_ops`]: the
//!   public operations
//!
//! ## Access
//!
//! Plan reads and writes, manual triggers and route operations are checked
//! against the caller's project before the unit of work starts.
//! [`Actor::System`] bypasses the check; the sweep always runs as system.
//!
//! # Example
//!
//! ```rust,no_run
//! use patrol_core::{access::Actor, params::Id, EngineBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = EngineBuilder::new()
//!     .with_database_path(Some("/tmp/patrol.db"))
//!     .build()
//!     .await?;
//!
//! let report = engine.sweep().await?;
//! println!("{report}");
//!
//! let order = engine.trigger_plan(Actor::System, &Id { id: 1 }).await?;
//! println!("{order}");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use jiff::Zoned;
use tokio::task;

use crate::{
    access::{AccessControl, Actor},
    clock::TimeSource,
    db::SqliteRepository,
    error::{InspectionError, Result},
    store::{Repository, Store},
};

pub mod builder;
pub mod directory_ops;
pub mod factory;
pub mod item_ops;
pub mod lifecycle;
pub mod order_ops;
pub mod plan_ops;
pub mod sweep;
pub mod trigger;


pub use builder::EngineBuilder;
pub use order_ops::Confirmation;
pub use sweep::{Firing, SweepFailure, SweepReport};

/// Coordinates plans, orders and the sweep over a repository.
pub struct Engine<R: Repository = SqliteRepository> {
    repository: Arc<R>,
    clock: Arc<dyn TimeSource>,
    access: Arc<dyn AccessControl>,
}

impl<R: Repository> Clone for Engine<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
            access: Arc::clone(&self.access),
        }
    }
}

impl<R: Repository> Engine<R> {
    /// Wires an engine from its collaborators. Most callers go through
    /// [`EngineBuilder`].
    pub fn new(
        repository: Arc<R>,
        clock: Arc<dyn TimeSource>,
        access: Arc<dyn AccessControl>,
    ) -> Self {
        Self {
            repository,
            clock,
            access,
        }
    }

    /// Current instant in the engine's time zone.
    pub fn now(&self) -> Zoned {
        self.clock.now()
    }

    /// Runs `f` as one unit of work on the blocking pool.
    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn Store) -> Result<T> + Send + 'static,
    {
        let repository = Arc::clone(&self.repository);

        task::spawn_blocking(move || repository.atomically(f))
            .await
            .map_err(|e| InspectionError::Configuration {
                message: format!("Task join error: {e}"),
            })?
    }

    /// Fails with `AccessDenied` unless `actor` may act on `project_id`.
    async fn authorize(&self, actor: Actor, project_id: u64) -> Result<()> {
        let subject_id = match actor {
            Actor::System => return Ok(()),
            Actor::User(id) => id,
        };
        let access = Arc::clone(&self.access);

        let allowed = task::spawn_blocking(move || access.has_project_access(subject_id, project_id))
            .await
            .map_err(|e| InspectionError::Configuration {
                message: format!("Task join error: {e}"),
            })??;

        if allowed {
            Ok(())
        } else {
            Err(InspectionError::AccessDenied {
                subject_id,
                project_id,
            })
        }
    }
}
