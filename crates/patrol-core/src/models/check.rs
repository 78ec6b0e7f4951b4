//! Check model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::CheckStatus;

/// Confirmation record for one route point within one order.
///
/// There is exactly one check per (order, point) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Check {
    /// Unique identifier for the check
    pub id: u64,

    /// Owning order
    pub order_id: u64,

    /// Route point being inspected
    pub point_id: u64,

    /// Inspection outcome
    pub status: CheckStatus,

    /// Free-form remark from the inspector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// When the point was last confirmed
    pub checked_at: Option<Timestamp>,
}
