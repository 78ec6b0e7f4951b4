//! Inspection item model definitions.

use serde::{Deserialize, Serialize};

/// A task carried out at every point it is attached to, such as "read the
/// pressure gauge".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: u64,
    pub title: String,
    pub details: Option<String>,
    /// How the task is performed, e.g. "visual" or "meter reading"
    pub execution_method: String,
}
