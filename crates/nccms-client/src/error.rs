//! Error types for CMS client operations

use crate::auth::{AuthEvent, AuthState};
use thiserror::Error;

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Broad failure classes the admin surfaces differently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Form input rejected, fixable by the user
    Validation,
    /// Credentials missing, expired or refused
    Authorization,
    /// Connectivity problems
    Network,
    /// Record does not exist
    NotFound,
    /// Anything else
    Other,
}

/// Errors that can occur while talking to the CMS
#[derive(Error, Debug)]
pub enum ClientError {
    /// The server refused the credentials (HTTP 401)
    #[error("Authorization denied for {url}")]
    Unauthorized {
        /// Request URL
        url: String,
    },

    /// The record does not exist (HTTP 404)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Missing resource
        resource: String,
    },

    /// Input rejected locally or by the server (HTTP 400)
    #[error("{message}")]
    Validation {
        /// Offending field, when known
        field: Option<String>,
        /// Message shown next to the form
        message: String,
    },

    /// Any other non-success status
    #[error("CMS API returned HTTP {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Server detail or canonical reason
        message: String,
    },

    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// A success response without the expected body
    #[error("Malformed response from {url}: {message}")]
    MalformedResponse {
        /// Request URL
        url: String,
        /// What was wrong
        message: String,
    },

    /// Mutation attempted without a session
    #[error("Read-only mode. Log in to modify {resource}.")]
    ReadOnly {
        /// Collection the mutation targeted
        resource: String,
    },

    /// Token obtain request failed
    #[error("Login failed: {reason}")]
    LoginFailed {
        /// Underlying reason
        reason: String,
    },

    /// The retry state machine was driven off its transition table
    #[error("Illegal authentication transition from {from:?} on {event:?}")]
    IllegalTransition {
        /// State before the event
        from: AuthState,
        /// Rejected event
        event: AuthEvent,
    },

    /// Configuration or token store failure
    #[error(transparent)]
    Core(#[from] nccms_core::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Create a new validation error
    #[must_use]
    pub fn validation<S: Into<String>>(field: Option<&str>, message: S) -> Self {
        Self::Validation {
            field: field.map(str::to_string),
            message: message.into(),
        }
    }

    /// Create a new read-only error
    #[must_use]
    pub fn read_only<S: Into<String>>(resource: S) -> Self {
        Self::ReadOnly {
            resource: resource.into(),
        }
    }

    /// Whether this is an authorization-denied response
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Whether this is a not-found response
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Failure class of this error
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Unauthorized { .. } | Self::ReadOnly { .. } | Self::LoginFailed { .. } => {
                ErrorCategory::Authorization
            }
            Self::Network(_) => ErrorCategory::Network,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Api { .. }
            | Self::MalformedResponse { .. }
            | Self::IllegalTransition { .. }
            | Self::Core(_)
            | Self::Json(_) => ErrorCategory::Other,
        }
    }

    /// Banner text for the admin
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized { .. } => "Session expired. Please log in again.".to_string(),
            Self::Network(_) => "Network error. Please try again.".to_string(),
            Self::LoginFailed { .. } => "Invalid credentials or server unreachable.".to_string(),
            other => other.to_string(),
        }
    }
}
