//! Plan model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::Trigger;

/// A recurring inspection definition: which route, who performs it, and how
/// often it fires.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// Unique identifier for the plan
    pub id: u64,

    /// Human readable name
    pub name: String,

    /// Owning project
    pub project_id: u64,

    /// Route walked by every order fired from this plan
    pub route_id: u64,

    /// Recurrence rule
    pub trigger: Trigger,

    /// Default assigner; orders fired with one start out `Assigned`
    pub assigner_id: Option<u64>,

    /// Staff eligible to carry out the inspection
    #[serde(default)]
    pub assignee_ids: Vec<u64>,

    /// Instant of the most recent successful firing
    pub last_triggered_at: Option<Timestamp>,

    /// Timestamp when the plan was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the plan was last modified (UTC)
    pub updated_at: Timestamp,
}
