//! Order model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::OrderStatus;

/// One concrete run of a plan's route inspection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique identifier for the order
    pub id: u64,

    /// Plan this order was fired from
    pub plan_id: u64,

    /// Current lifecycle state
    pub status: OrderStatus,

    /// Who handed the work out
    pub assigner_id: Option<u64>,

    /// Who carries the work out
    pub assignee_id: Option<u64>,

    /// Set when the order moves to `InProgress`
    pub started_at: Option<Timestamp>,

    /// Set when the order moves to `Completed`
    pub ended_at: Option<Timestamp>,

    /// Free-form inspection result recorded on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inspection_data: Option<String>,

    /// Number of checks confirmed so far
    pub completed_checks: u32,

    /// Number of checks created for the order
    pub total_checks: u32,

    /// Optimistic concurrency token, bumped on every save
    pub revision: u64,

    /// Timestamp when the order was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the order was last updated (UTC)
    pub updated_at: Timestamp,
}

impl Order {
    /// Checks still waiting for confirmation.
    pub fn remaining_checks(&self) -> u32 {
        self.total_checks.saturating_sub(self.completed_checks)
    }
}
