//! Core error types for the PropShare client.
//!
//! This module defines transport-agnostic error types. Gateway implementations
//! (HTTP, in-memory) convert their failures into [`GatewayError`], and the
//! services lift those into the root [`Error`].

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Type alias for results produced by the remote data gateway.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Message shown to the user for failures that are not their fault.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Something went wrong while contacting the server. Please try again.";

/// Root error type for the client.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Gateway request failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("A request for '{0}' is already in progress")]
    MutationInFlight(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Coarse classification of an [`Error`], used by callers to decide how to
/// present a failure and whether offering a retry makes sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caught locally before any network call.
    Validation,
    /// The backend refused the request on business grounds.
    Rejected,
    /// Network or server failure; the user may retry.
    Transport,
    /// Missing or expired session.
    Auth,
    /// Anything else (double submit, configuration, internal).
    Other,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Gateway(GatewayError::Rejected(_)) => ErrorKind::Rejected,
            Error::Gateway(GatewayError::Transport(_)) => ErrorKind::Transport,
            Error::Gateway(GatewayError::NotAuthenticated) | Error::NotAuthenticated => {
                ErrorKind::Auth
            }
            _ => ErrorKind::Other,
        }
    }

    /// Returns true if the user may reasonably retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport)
    }

    /// The message to surface to the user.
    ///
    /// Validation failures and domain rejections are shown verbatim; transport
    /// failures collapse into a generic message.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(err) => err.to_string(),
            Error::Gateway(GatewayError::Rejected(message)) => message.clone(),
            Error::Gateway(GatewayError::NotFound(what)) => format!("{} not found", what),
            Error::Gateway(GatewayError::NotAuthenticated) | Error::NotAuthenticated => {
                "Please sign in to continue.".to_string()
            }
            Error::MutationInFlight(_) => "Your previous request is still processing.".to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Errors returned by the remote data gateway.
///
/// The type is `Clone` so that the outcome of one coalesced fetch can be
/// handed to every reader waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Business-rule failure reported by the backend.
    #[error("{0}")]
    Rejected(String),

    /// The request never produced a usable response.
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
}

impl GatewayError {
    /// Only transport failures are worth retrying automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Transport(_))
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Decode(err.to_string())
    }
}

/// Validation errors raised before any request leaves the client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Number of shares must be at least 1")]
    NonPositiveShares,

    #[error("Only {available} shares are available (requested {requested})")]
    ExceedsAvailable { requested: i64, available: i64 },

    #[error("You only own {owned} shares (requested {requested})")]
    ExceedsOwned { requested: i64, owned: i64 },

    #[error("You do not own any shares of this property")]
    NoInvestment,

    #[error("Property is not open for investment (status: {0})")]
    PropertyNotActive(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
