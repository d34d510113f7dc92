//! # hubprune Core
//!
//! Core types and retention rules for the hubprune registry housekeeping tool.
//!
//! This crate holds the pieces of a prune run that need no network access:
//!
//! - [`Credentials`] - validated account username and password
//! - [`RepositoryId`] - a `namespace/name` repository identifier
//! - [`TagRecord`] - a tag and its last-updated timestamp as listed by the registry
//! - [`RetentionPolicy`] - the age threshold and exclusion pattern, and the
//!   [`Verdict`] it produces for each tag
//!
//! ## Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use hubprune_core::{Decision, RetentionPolicy, TagRecord};
//!
//! let policy = RetentionPolicy::new(30, "^release-").unwrap();
//! let now = Utc.with_ymd_and_hms(2020, 3, 1, 0, 0, 0).unwrap();
//!
//! let verdict = policy.evaluate(&TagRecord::new("v1", "2020-01-01T00:00:00Z"), now).unwrap();
//! assert_eq!(verdict.age_days, 60);
//! assert_eq!(verdict.decision, Decision::Delete);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod credentials;
pub mod error;
pub mod repository;
pub mod retention;


pub use credentials::Credentials;
pub use error::{Error, Result};
pub use repository::{RepositoryId, TagRecord};
pub use retention::{Decision, RetentionPolicy, Verdict, DEFAULT_THRESHOLD_DAYS};
