//! Error types for the IronLog engine.
//!
//! One typed error enum covers the whole operation surface:
//! - Open/migration and transaction failures map from the underlying
//!   storage and serialization crates via `#[from]`
//! - Logical not-found errors carry the offending id
//! - Absent values on point lookups are `Ok(None)`, not errors

use thiserror::Error;

/// Result type alias for IronLog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in IronLog engine operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A mutation named a session id that does not exist.
    ///
    /// Read-only point lookups (`get_session`) resolve with `Ok(None)`
    /// instead; only mutations escalate the absence to an error.
    #[error("Session not found: {id}")]
    SessionNotFound { id: String },

    /// A mutation named an exercice id that no session contains.
    #[error("No exercice with id {id}")]
    ExerciceNotFound { id: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking pool failed to run a storage closure to completion.
    #[error("Storage task failed: {0}")]
    Task(String),
}

impl Error {
    /// Whether this error is a logical not-found (as opposed to a
    /// storage or serialization failure).
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SessionNotFound { .. } | Self::ExerciceNotFound { .. }
        )
    }
}
