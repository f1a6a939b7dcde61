//! Shared error definitions for the shim.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the client adapter.
///
/// Failures propagate synchronously to the immediate caller; there is no
/// retry layer. A response whose *shape* is unexpected is not an error at
/// all (see [`crate::GenerateResponse`]).
#[derive(Debug, Error)]
pub enum Error {
    /// The adapter is missing a credential or was given an invalid endpoint.
    #[error("configuration error: {reason}")]
    Configuration {
        /// Additional context for the failure.
        reason: String,
    },

    /// Transport failure, timeout, or non-success HTTP status.
    #[error("request failed: {reason}")]
    Request {
        /// Underlying cause of the failure.
        reason: String,
    },
}

impl Error {
    /// Convenience constructor for configuration issues.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for request failures.
    #[must_use]
    pub fn request(reason: impl Into<String>) -> Self {
        Self::Request {
            reason: reason.into(),
        }
    }
}
