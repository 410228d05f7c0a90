//! Error types for MotoMinder

use thiserror::Error;

/// Result type alias using MotoMinder's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Message returned to callers in place of internal error detail
pub const GENERIC_INTERNAL_MESSAGE: &str = "An error occurred on the server";

/// Broad error category, used by callers to pick a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input; nothing was written
    Validation,
    /// A referenced tag, entity or association does not exist
    NotFound,
    /// Duplicate tag name or duplicate tag assignment
    Conflict,
    /// Datastore or environment failure
    Internal,
}

/// MotoMinder error types
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (E001-E099)
    #[error("{0}")]
    InvalidInput(String),

    // Entity errors (E100-E199)
    #[error("Garage not found")]
    GarageNotFound(i64),

    #[error("Bike not found")]
    BikeNotFound(i64),

    #[error("Section not found")]
    SectionNotFound(i64),

    #[error("Part not found")]
    PartNotFound(i64),

    #[error("Tag not found")]
    TagNotFound(i64),

    #[error("Maintenance record not found")]
    MaintenanceNotFound(i64),

    #[error("Tag assignment not found")]
    AssignmentNotFound,

    // Conflict errors (E200-E299)
    #[error("Tag name already exists")]
    DuplicateTagName(String),

    #[error("Tag is already assigned to this item")]
    DuplicateAssignment,

    // Database errors (E400-E499)
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a validation failure
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Get the error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::Validation,
            Self::GarageNotFound(_)
            | Self::BikeNotFound(_)
            | Self::SectionNotFound(_)
            | Self::PartNotFound(_)
            | Self::TagNotFound(_)
            | Self::MaintenanceNotFound(_)
            | Self::AssignmentNotFound => ErrorKind::NotFound,
            Self::DuplicateTagName(_) | Self::DuplicateAssignment => ErrorKind::Conflict,
            Self::DatabaseError(_) | Self::ConfigError(_) | Self::Io(_) => ErrorKind::Internal,
        }
    }

    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "E001",
            Self::GarageNotFound(_) => "E101",
            Self::BikeNotFound(_) => "E102",
            Self::SectionNotFound(_) => "E103",
            Self::PartNotFound(_) => "E104",
            Self::TagNotFound(_) => "E105",
            Self::MaintenanceNotFound(_) => "E106",
            Self::AssignmentNotFound => "E107",
            Self::DuplicateTagName(_) => "E200",
            Self::DuplicateAssignment => "E201",
            Self::DatabaseError(_) => "E400",
            Self::ConfigError(_) => "E600",
            Self::Io(_) => "E9999",
        }
    }

    /// Message safe to show to the caller.
    ///
    /// Internal errors collapse to [`GENERIC_INTERNAL_MESSAGE`] unless
    /// `expose_internal` is set (development mode).
    pub fn public_message(&self, expose_internal: bool) -> String {
        match self.kind() {
            ErrorKind::Internal if !expose_internal => GENERIC_INTERNAL_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }

    /// True when the underlying datastore rejected a write on a UNIQUE constraint
    pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
        matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
    }

    pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
        matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
    }
}
