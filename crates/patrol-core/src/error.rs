//! Error types for the inspection engine.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all engine operations.
#[derive(Error, Debug)]
pub enum InspectionError {
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Plan not found for the given ID
    #[error("Plan with ID {id} not found")]
    PlanNotFound { id: u64 },
    /// Order not found for the given ID
    #[error("Order with ID {id} not found")]
    OrderNotFound { id: u64 },
    /// Route not found for the given ID
    #[error("Route with ID {id} not found")]
    RouteNotFound { id: u64 },
    /// Point not found for the given ID
    #[error("Point with ID {id} not found")]
    PointNotFound { id: u64 },
    /// Inspection item not found for the given ID
    #[error("Inspection item with ID {id} not found")]
    ItemNotFound { id: u64 },
    /// No check exists for the (order, point) pair
    #[error("No check for point {point_id} on order {order_id}")]
    CheckNotFound { order_id: u64, point_id: u64 },
    /// User not found for the given ID
    #[error("User with ID {id} not found")]
    UserNotFound { id: u64 },
    /// Caller is not a member of the resource's project
    #[error("User {subject_id} has no access to project {project_id}")]
    AccessDenied { subject_id: u64, project_id: u64 },
    /// Action attempted against an order in the wrong state
    #[error("Order {order_id} state conflict: {reason}")]
    StateConflict { order_id: u64, reason: String },
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Failures reported by a non-SQL store
    #[error("Store error: {message}")]
    Store { message: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// The coarse failure categories surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    AccessDenied,
    StateConflict,
    Persistence,
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> InspectionError {
        InspectionError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> InspectionError {
        InspectionError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl InspectionError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates a state conflict error for an order.
    pub fn state_conflict(order_id: u64, reason: impl fmt::Display) -> Self {
        Self::StateConflict {
            order_id,
            reason: reason.to_string(),
        }
    }

    /// Classifies the error into one of the caller-facing kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::Validation,
            Self::PlanNotFound { .. }
            | Self::OrderNotFound { .. }
            | Self::RouteNotFound { .. }
            | Self::PointNotFound { .. }
            | Self::ItemNotFound { .. }
            | Self::CheckNotFound { .. }
            | Self::UserNotFound { .. } => ErrorKind::NotFound,
            Self::AccessDenied { .. } => ErrorKind::AccessDenied,
            Self::StateConflict { .. } => ErrorKind::StateConflict,
            Self::Database { .. }
            | Self::Store { .. }
            | Self::FileSystem { .. }
            | Self::XdgDirectory(_)
            | Self::Configuration { .. } => ErrorKind::Persistence,
        }
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| InspectionError::database(message).with_source(e))
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, InspectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let err = InspectionError::invalid_input("trigger_day").with_reason("out of range");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(
            InspectionError::CheckNotFound {
                order_id: 1,
                point_id: 2
            }
            .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            InspectionError::state_conflict(3, "not in progress").kind(),
            ErrorKind::StateConflict
        );
        assert_eq!(
            InspectionError::Store {
                message: "disk full".into()
            }
            .kind(),
            ErrorKind::Persistence
        );
    }

    #[test]
    fn test_messages() {
        let err = InspectionError::AccessDenied {
            subject_id: 4,
            project_id: 9,
        };
        assert_eq!(err.to_string(), "User 4 has no access to project 9");

        let err = InspectionError::state_conflict(7, "order is pending");
        assert_eq!(err.to_string(), "Order 7 state conflict: order is pending");
    }
}
