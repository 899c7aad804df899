//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

use std::fmt;

use super::validation::Violation;

#[derive(Debug)]
pub enum DomainError {
    /// Resource not found
    NotFound,
    /// One or more properties failed validation
    Validation(Vec<Violation>),
    /// Database/persistence error
    Database(String),
    /// External service error
    External(String),
    /// A background facility (e.g. the cover queue) is not accepting work
    Unavailable(String),
    /// Generic internal error
    Internal(String),
}

impl DomainError {
    /// Shorthand for a single-property validation failure
    pub fn invalid(property_path: &str, message: &str) -> Self {
        DomainError::Validation(vec![Violation::new(property_path, message)])
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NotFound => write!(f, "Resource not found"),
            DomainError::Validation(violations) => {
                let lines: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", lines.join("\n"))
            }
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
            DomainError::External(msg) => write!(f, "External service error: {}", msg),
            DomainError::Unavailable(msg) => write!(f, "Service unavailable: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}
