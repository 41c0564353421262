//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// A degree, course, timeline or user record does not exist.
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// Malformed engine input (missing timeline fields, reversed term ranges, ...).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Term string with an unrecognized season token or year.
    #[error("Invalid term: {0}")]
    InvalidTerm(String),

    /// Timeline requested by a user who does not own it.
    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("Repository error: {0}")]
    Repo(String),
}

impl DomainError {
    pub fn degree_not_found(key: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "Degree",
            key: key.into(),
        }
    }

    pub fn course_not_found(key: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "Course",
            key: key.into(),
        }
    }

    pub fn timeline_not_found(key: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "Timeline",
            key: key.into(),
        }
    }

    pub fn user_not_found(key: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "User",
            key: key.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// `InvalidTerm` is a validation failure raised by term parsing.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidTerm(_))
    }
}
