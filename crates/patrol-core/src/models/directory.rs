//! Projects and users, as far as access checks need them.

use serde::{Deserialize, Serialize};

/// An organisational unit owning plans and routes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub parent_id: Option<u64>,
}

/// A person acting on the system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub username: String,
    /// Project membership; `None` marks a global administrator
    pub project_id: Option<u64>,
}
