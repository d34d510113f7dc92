//! Error types for hubprune core operations.
//!
//! This module defines the error types used throughout the `hubprune-core` crate.

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in hubprune core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A required credential was missing or empty.
    #[error("Missing required credential: {field}")]
    MissingCredential {
        /// Name of the missing field.
        field: &'static str,
    },

    /// A repository identifier was not of the form `namespace/name`.
    #[error("Invalid repository '{value}': expected 'namespace/name'")]
    InvalidRepository {
        /// The rejected value.
        value: String,
    },

    /// The exclusion pattern is not a valid regular expression.
    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// A tag's last-updated timestamp could not be parsed as a date.
    #[error("Invalid last_updated for tag '{tag}': {value:?}")]
    InvalidTimestamp {
        /// Tag name.
        tag: String,
        /// The raw timestamp, if the registry sent one.
        value: Option<String>,
    },
}
