//! Data models for plans, orders and checks.
//!
//! These are the domain records the engine reads and writes through the
//! store interfaces in [`crate::store`]. Display implementations live in
//! [`crate::display::models`] so presentation stays out of the data layer.
//!
//! # Ownership
//!
//! - A [`Plan`] references a [`Route`] and a project; it is never owned by
//!   the engine and only its `last_triggered_at` is written by sweeps.
//! - An [`Order`] references the plan it was fired from and exclusively owns
//!   its [`Check`]s, one per route point.
//!
//! # Examples
//!
//! ```rust
//! use patrol_core::models::{MonthDay, Trigger};
//!
//! let trigger = Trigger::from_parts("monthly", 15).unwrap();
//! assert_eq!(trigger, Trigger::Monthly(MonthDay::new(15).unwrap()));
//! assert!(Trigger::from_parts("weekly", 7).is_err());
//! ```

pub mod check;
pub mod directory;
pub mod item;
pub mod order;
pub mod plan;
pub mod route;
pub mod status;
pub mod trigger;

#[cfg(test)]
mod tests;

pub use check::Check;
pub use directory::{Project, User};
pub use item::Item;
pub use order::Order;
pub use plan::Plan;
pub use route::{Point, Route};
pub use status::{CheckStatus, OrderStatus};
pub use trigger::{MonthDay, Trigger, TriggerKind, WeekDay};
