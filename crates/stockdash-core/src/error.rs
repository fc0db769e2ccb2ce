//! Error types for fetching and shaping dashboard data.
//!
//! [`DashError`] covers every way a resource fetch can fail. It is `Clone` so a
//! failure can be stored alongside the resource it belongs to, and each variant
//! maps onto one [`ErrorKind`] for display purposes.
//!
//! Missing or malformed fields inside a successfully fetched payload are not
//! errors: the resolvers in this crate degrade them to absent values or empty
//! series instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur while fetching a resource.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashError {
    /// No ticker was supplied for a request that needs one.
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Transport failure, or a non-2xx response without a usable body.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend reported an error, either through a non-2xx response with a
    /// message or through an explicit `error` field in the body.
    #[error("Backend error: {0}")]
    Backend(String),

    /// The body is not JSON or lacks the shape expected for the resource.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl DashError {
    /// Returns the coarse category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingInput(_) => ErrorKind::MissingInput,
            Self::Network(_) => ErrorKind::NetworkFailure,
            Self::Backend(_) => ErrorKind::BackendError,
            Self::InvalidResponse(_) => ErrorKind::InvalidResponse,
        }
    }
}

/// Category of a fetch failure, as surfaced to the view consuming the resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No ticker supplied.
    MissingInput,
    /// Transport-level failure.
    NetworkFailure,
    /// Structured error reported by the backend.
    BackendError,
    /// Unparseable or mis-shaped body.
    InvalidResponse,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::MissingInput => "missing input",
            Self::NetworkFailure => "network failure",
            Self::BackendError => "backend error",
            Self::InvalidResponse => "invalid response",
        };
        f.write_str(label)
    }
}

/// Error returned when a request parameter or path cannot be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseParamError {
    /// The value is not one of the accepted spellings.
    #[error("Unknown {param}: {value:?} (expected one of {expected})")]
    Unknown {
        /// Name of the parameter being parsed.
        param: &'static str,
        /// The rejected input.
        value: String,
        /// Human-readable list of accepted values.
        expected: &'static str,
    },

    /// A path was constructed without any keys.
    #[error("Path must contain at least one key")]
    EmptyPath,
}

/// Result type alias using [`DashError`].
pub type Result<T> = std::result::Result<T, DashError>;
