//! Core library for the Patrol inspection workflow engine.
//!
//! Inspection plans describe a route of points to walk and a trigger (a day
//! of the month, a day of the week, or manual only). A periodic sweep fires
//! every plan that is due, turning it into an inspection order with one
//! pending check per point. Orders then move through
//! `pending → assigned → in_progress → completed` as inspectors confirm
//! each point.
//!
//! # Layout
//!
//! - [`engine`]: the [`Engine`] and its operations, including the sweep
//! - [`scheduler`]: background task that runs sweeps on a schedule
//! - [`store`] and [`db`]: persistence traits with in-memory and SQLite
//!   implementations
//! - [`models`], [`params`]: domain records and operation parameters
//! - [`display`]: markdown formatting for the terminal
//!
//! # Quick Start
//!
//! ```rust
//! use jiff::{civil::date, tz::TimeZone};
//! use patrol_core::{
//!     access::Actor,
//!     clock::FixedClock,
//!     params::{CreatePlan, CreatePoint, CreateProject, CreateRoute},
//!     EngineBuilder, MemoryRepository,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> patrol_core::Result<()> {
//! let now = date(2024, 3, 15).at(9, 0, 0, 0).to_zoned(TimeZone::UTC).unwrap();
//! let engine = EngineBuilder::new()
//!     .with_clock(Arc::new(FixedClock::new(now)))
//!     .build_with_repository(Arc::new(MemoryRepository::new()));
//!
//! let project = engine
//!     .create_project(&CreateProject { name: "Plant A".into(), parent_id: None })
//!     .await?;
//! let point = engine
//!     .create_point(&CreatePoint { name: "Pump".into(), ..Default::default() })
//!     .await?;
//! let route = engine
//!     .create_route(
//!         Actor::System,
//!         &CreateRoute {
//!             name: "Basement".into(),
//!             project_id: project.id,
//!             description: None,
//!             point_ids: vec![point.id],
//!         },
//!     )
//!     .await?;
//! engine
//!     .create_plan(
//!         Actor::System,
//!         &CreatePlan {
//!             name: "Monthly pump check".into(),
//!             project_id: project.id,
//!             route_id: route.id,
//!             trigger_kind: "monthly".into(),
//!             trigger_day: 15,
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//!
//! let report = engine.sweep().await?;
//! assert_eq!(report.fired.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod clock;
pub mod db;
pub mod display;
pub mod engine;
pub mod error;
pub mod models;
pub mod params;
pub mod scheduler;
pub mod store;

// Re-export commonly used types
pub use access::{AccessControl, Actor};
pub use clock::{FixedClock, SystemClock, TimeSource};
pub use db::SqliteRepository;
pub use display::{
    Checks, CreateResult, DeleteResult, Items, OperationStatus, Orders, Plans, UpdateResult,
};
pub use engine::{Confirmation, Engine, EngineBuilder, SweepReport};
pub use error::{ErrorKind, InspectionError, Result};
pub use models::{Check, CheckStatus, Item, Order, OrderStatus, Plan, Route, Trigger};
pub use scheduler::{Scheduler, SchedulerHandle, SweepSchedule};
pub use store::{MemoryRepository, Repository};
