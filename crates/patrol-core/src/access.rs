//! Project membership checks.
//!
//! Access is flat: a user may act on a project's resources only when the
//! user belongs to exactly that project. A user with no project is a global
//! administrator. Project parents are recorded but grant nothing; ancestors
//! and descendants are separate projects for access purposes.

use crate::{error::Result, models::User};

/// Who is performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// Internal callers such as the scheduler sweep or a local operator
    System,
    /// A registered user, subject to membership checks
    User(u64),
}

/// Answers membership questions for the engine.
pub trait AccessControl: Send + Sync {
    fn has_project_access(&self, subject_id: u64, project_id: u64) -> Result<bool>;
}

/// The single access policy: unknown subjects are denied, project-less
/// users see everything, everyone else only their own project.
pub fn project_access(user: Option<&User>, project_id: u64) -> bool {
    match user {
        None => false,
        Some(User {
            project_id: None, ..
        }) => true,
        Some(User {
            project_id: Some(own),
            ..
        }) => *own == project_id,
    }
}
