//! Status enumerations for orders and checks.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle state of an inspection order.
///
/// Orders only move forward through `Pending → Assigned → InProgress →
/// Completed`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created without an assigner, waiting to be assigned
    Pending,

    /// Someone is responsible for the order
    Assigned,

    /// Field work has started
    InProgress,

    /// All points confirmed and the result recorded
    Completed,
}

impl OrderStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Assigned => "assigned",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
        }
    }

    /// Get status with a consistent icon for display.
    ///
    /// ```rust
    /// use patrol_core::models::OrderStatus;
    ///
    /// assert_eq!(OrderStatus::Completed.with_icon(), "✓ Completed");
    /// assert_eq!(OrderStatus::Pending.with_icon(), "○ Pending");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "○ Pending",
            OrderStatus::Assigned => "◐ Assigned",
            OrderStatus::InProgress => "➤ In Progress",
            OrderStatus::Completed => "✓ Completed",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "assigned" => Ok(OrderStatus::Assigned),
            "in_progress" | "inprogress" => Ok(OrderStatus::InProgress),
            "completed" => Ok(OrderStatus::Completed),
            _ => Err(format!("Invalid order status: {s}")),
        }
    }
}

/// Result of inspecting one route point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// Not inspected yet
    #[default]
    Pending,

    /// Point inspected and fine
    Passed,

    /// Point inspected and found faulty
    Failed,
}

impl CheckStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pending => "pending",
            CheckStatus::Passed => "passed",
            CheckStatus::Failed => "failed",
        }
    }

    /// Whether the check carries an inspection outcome.
    pub fn is_confirmed(&self) -> bool {
        !matches!(self, CheckStatus::Pending)
    }

    /// Get status with a consistent icon for display.
    pub fn with_icon(&self) -> &'static str {
        match self {
            CheckStatus::Pending => "○ Pending",
            CheckStatus::Passed => "✓ Passed",
            CheckStatus::Failed => "✗ Failed",
        }
    }
}

impl FromStr for CheckStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(CheckStatus::Pending),
            "passed" | "pass" => Ok(CheckStatus::Passed),
            "failed" | "fail" => Ok(CheckStatus::Failed),
            _ => Err(format!("Invalid check status: {s}")),
        }
    }
}
