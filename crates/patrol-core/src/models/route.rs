//! Route and point model definitions.

use serde::{Deserialize, Serialize};

/// A physical location visited during an inspection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Point {
    pub id: u64,
    pub name: String,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// An ordered walk over inspection points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Route {
    pub id: u64,
    pub name: String,
    pub project_id: u64,
    pub description: Option<String>,
    /// Points in walking order
    #[serde(default)]
    pub points: Vec<Point>,
}
