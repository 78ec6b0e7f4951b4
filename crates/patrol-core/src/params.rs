//! Parameter structures for engine operations
//!
//! These structures are shared by every interface (the CLI today, a transport
//! layer tomorrow) and deliberately carry no framework derives beyond serde.
//! Interface layers wrap them with their own argument types and convert with
//! `From` impls:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │  Core Params    │    │     Engine      │
//! │  (clap derives) │───▶│ (serde derives) │───▶│  (validation)   │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! Loose fields such as `trigger_kind`/`trigger_day` are validated by the
//! engine, not here, so every interface gets the same error messages.

use serde::{Deserialize, Serialize};

/// Generic parameters for operations requiring just an ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Id {
    /// The ID of the resource to operate on
    pub id: u64,
}

/// Parameters for creating a new plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePlan {
    /// Name of the plan (required)
    pub name: String,
    /// Project the plan belongs to
    pub project_id: u64,
    /// Route inspected by the plan
    pub route_id: u64,
    /// One of `monthly`, `weekly`, `manual`
    pub trigger_kind: String,
    /// 1-31 for monthly, 0-6 for weekly (0 = Sunday), ignored for manual
    #[serde(default)]
    pub trigger_day: i64,
    /// Default assigner for fired orders
    pub assigner_id: Option<u64>,
    /// Eligible inspectors
    #[serde(default)]
    pub assignee_ids: Vec<u64>,
}

/// Parameters for updating an existing plan. Unset fields are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePlan {
    pub id: u64,
    pub name: Option<String>,
    pub route_id: Option<u64>,
    pub trigger_kind: Option<String>,
    pub trigger_day: Option<i64>,
    pub assigner_id: Option<u64>,
    /// Clears the default assigner when true
    #[serde(default)]
    pub clear_assigner: bool,
    pub assignee_ids: Option<Vec<u64>>,
}

/// Parameters for listing plans.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPlans {
    /// Restrict to one project; otherwise every accessible project
    pub project_id: Option<u64>,
}

/// Parameters for listing orders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListOrders {
    pub plan_id: Option<u64>,
    /// Status name, e.g. `in_progress`
    pub status: Option<String>,
}

/// Parameters for assigning an order to an inspector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignOrder {
    pub order_id: u64,
    pub assignee_id: u64,
}

/// Parameters for confirming one point of an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfirmCheck {
    pub order_id: u64,
    pub point_id: u64,
    /// `passed` or `failed`
    pub status: String,
    pub comment: Option<String>,
}

/// Parameters for completing an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompleteOrder {
    pub order_id: u64,
    /// Free-form inspection result (required)
    pub inspection_data: String,
}

/// Parameters for creating an inspection point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePoint {
    pub name: String,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// Parameters for creating an inspection item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateItem {
    pub title: String,
    pub details: Option<String>,
    pub execution_method: String,
}

/// Parameters for updating an inspection item. Omitted fields keep their
/// value; an empty `details` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateItem {
    pub id: u64,
    pub title: Option<String>,
    pub details: Option<String>,
    pub execution_method: Option<String>,
}

/// An item and the point it is attached to or detached from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PointItem {
    pub point_id: u64,
    pub item_id: u64,
}

/// Parameters for creating a route over existing points.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateRoute {
    pub name: String,
    pub project_id: u64,
    pub description: Option<String>,
    /// Points in walking order
    #[serde(default)]
    pub point_ids: Vec<u64>,
}

/// Parameters for creating a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub parent_id: Option<u64>,
}

/// Parameters for registering a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    /// Omit to register a global administrator
    pub project_id: Option<u64>,
}
