//! Error types for registry operations.

use thiserror::Error;

/// Errors that can occur while talking to the registry.
#[derive(Debug, Error)]
pub enum HubError {
    /// Failed to connect to registry.
    #[error("Failed to connect to registry at {url}: {source}")]
    ConnectionFailed {
        /// Registry URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// The login call was rejected.
    #[error("Authentication failed with status {status}: {message}")]
    AuthenticationFailed {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// A repository or tag listing call was rejected.
    #[error("Failed to list {target}: status {status}: {message}")]
    ListingFailed {
        /// What was being listed (e.g. "tags of acme/app").
        target: String,
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// A tag delete call was rejected.
    #[error("Failed to delete tag {repository}:{tag}: status {status}: {message}")]
    DeletionFailed {
        /// Repository the tag belongs to.
        repository: String,
        /// Tag name.
        tag: String,
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// A successful response lacked a field the client needs.
    #[error("Response for {target} is missing field '{field}'")]
    MissingField {
        /// What was being requested.
        target: String,
        /// Name of the missing field.
        field: &'static str,
    },

    /// Transport-level HTTP error.
    #[error("HTTP error from registry: {status} - {message}")]
    HttpError {
        /// HTTP status code, 0 when none was received.
        status: u16,
        /// Error message.
        message: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {source}")]
    JsonError {
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid URL.
    #[error("Invalid URL: {url}")]
    InvalidUrl {
        /// URL string.
        url: String,
    },

    /// A pagination cursor points away from the registry.
    #[error("Refusing to follow cursor outside the registry origin: {url}")]
    ForeignCursor {
        /// The rejected cursor URL.
        url: String,
    },

    /// Domain error from the core crate.
    #[error(transparent)]
    Core(#[from] hubprune_core::Error),
}

impl HubError {
    /// Returns the upstream HTTP status, if the error carries one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::AuthenticationFailed { status, .. }
            | Self::ListingFailed { status, .. }
            | Self::DeletionFailed { status, .. } => Some(*status),
            Self::HttpError { status, .. } if *status != 0 => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for HubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::ConnectionFailed {
                url: err
                    .url()
                    .map_or_else(|| "unknown".to_string(), ToString::to_string),
                source: err,
            }
        } else if err.is_status() {
            let status = err.status().map_or(0, |s| s.as_u16());
            Self::HttpError {
                status,
                message: err.to_string(),
            }
        } else {
            Self::HttpError {
                status: 0,
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for HubError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError { source: err }
    }
}
