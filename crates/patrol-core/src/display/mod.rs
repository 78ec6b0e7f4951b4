//! Markdown formatting for models, collections and operation results.
//!
//! Domain models implement [`Display`](std::fmt::Display) directly in
//! [`models`]. Lists are wrapped in the newtypes from [`collections`], and
//! the outcome of a create, update or delete call is wrapped in one of the
//! types from [`results`]. Everything produces markdown, which the CLI
//! renders for the terminal.
//!
//! - [`collections`]: [`Plans`], [`Orders`], [`Checks`], [`Items`]
//! - [`results`]: [`CreateResult`], [`UpdateResult`], [`DeleteResult`]
//! - [`status`]: [`OperationStatus`]
//! - [`datetime`]: timestamps in the local time zone
//!
//! ```rust
//! use patrol_core::display::OperationStatus;
//!
//! let status = OperationStatus::success("Plan 3 fired".to_string());
//! assert_eq!(status.to_string(), "Success: Plan 3 fired\n");
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;

pub use collections::{Checks, Items, Orders, Plans};
pub use datetime::{LocalDateTime, MaybeDateTime};
pub use results::{CreateResult, DeleteResult, UpdateResult};
pub use status::OperationStatus;
