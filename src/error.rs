//! Error types for the quota reconciler.
//!
//! This module provides the error hierarchy for every stage of a run:
//! configuration loading, calls to the Rancher control plane and the
//! per-cluster Kubernetes API, and report generation.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the quota reconciler.
#[derive(Debug, Error)]
pub enum QuotaError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rancher or Kubernetes API errors.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// No API token could be resolved for the instance.
    #[error("No API token configured: {message}")]
    MissingToken {
        /// Which sources were consulted.
        message: String,
    },

    /// A kubeconfig asked for an authentication method this tool cannot use.
    #[error("Unsupported kubeconfig authentication: {message}")]
    UnsupportedAuth {
        /// Description of the unsupported method.
        message: String,
    },
}

/// Errors returned by the Rancher control plane or a cluster API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credentials were rejected (HTTP 401).
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Response body or description.
        message: String,
    },

    /// Credentials lack permission (HTTP 403).
    #[error("Authorization failed - insufficient permissions: {message}")]
    AuthorizationFailed {
        /// Response body or description.
        message: String,
    },

    /// The addressed resource does not exist (HTTP 404).
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Endpoint or resource identifier.
        resource: String,
    },

    /// Any other non-retryable 4xx response.
    #[error("Client error {status}: {message}")]
    ClientError {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// Retryable failures (5xx, 409, network) persisted past the attempt ceiling.
    #[error("Request failed after {attempts} attempt(s): {message}")]
    RequestFailed {
        /// Number of attempts made.
        attempts: u32,
        /// Last failure observed.
        message: String,
    },

    /// The HTTP client could not be constructed.
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error.
        message: String,
    },

    /// A response could not be decoded.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },

    /// A request could not be formed from the given arguments.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of the problem.
        message: String,
    },
}

/// Coarse error categories shared by every failure the tool reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Credentials rejected.
    Authentication,
    /// Credentials lack permission.
    Authorization,
    /// Resource missing.
    NotFound,
    /// Conflict or server fault that persisted past retries.
    Transient,
    /// Invalid or incomplete configuration.
    Configuration,
    /// Anything else.
    Unexpected,
}

/// Result type alias for quota reconciler operations.
pub type Result<T> = std::result::Result<T, QuotaError>;

impl QuotaError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Maps the error onto its coarse category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::Api(ApiError::AuthenticationFailed { .. }) => ErrorKind::Authentication,
            Self::Api(ApiError::AuthorizationFailed { .. }) => ErrorKind::Authorization,
            Self::Api(ApiError::NotFound { .. }) => ErrorKind::NotFound,
            Self::Api(ApiError::RequestFailed { .. }) => ErrorKind::Transient,
            Self::Api(_) | Self::Io(_) | Self::Internal(_) => ErrorKind::Unexpected,
        }
    }

    /// Returns true for errors raised by a remote API.
    #[must_use]
    pub const fn is_api(&self) -> bool {
        matches!(self, Self::Api(_))
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl ApiError {
    /// Creates an invalid response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }
}
