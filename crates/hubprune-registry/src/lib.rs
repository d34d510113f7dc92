//! # hubprune Registry
//!
//! Docker Hub API client and tag sweeper for hubprune.
//!
//! This crate logs in to the registry, lists repositories and tags, and
//! deletes tags that a [`RetentionPolicy`](hubprune_core::RetentionPolicy)
//! marks as expired.
//!
//! ## Features
//!
//! - **Session auth**: one login exchange per run, bearer token on every call
//! - **Two pagination strategies**: numbered pages walked from last to first,
//!   or registry-supplied `next` cursors
//! - **Contained failures**: a failing repository or tag does not stop the rest
//!   of the sweep
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hubprune_core::{Credentials, RepositoryId, RetentionPolicy};
//! use hubprune_registry::{HubClient, NoopObserver, RegistryConfig, SweepOptions, Sweeper};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials::new("acme", "s3cret")?;
//!     let session = HubClient::new(RegistryConfig::default())?
//!         .login(&credentials)
//!         .await?;
//!
//!     let policy = RetentionPolicy::new(30, "^release-")?;
//!     let repositories: Vec<RepositoryId> = vec!["acme/app".parse()?];
//!
//!     let report = Sweeper::new(&session, &policy, SweepOptions::default())
//!         .run(&repositories, &mut NoopObserver)
//!         .await;
//!     println!("deleted {} tags", report.deleted());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐ login ┌──────────────┐  TagRegistry  ┌──────────────┐
//! │  HubClient   │──────▶│  HubSession  │◀──────────────│   Sweeper    │
//! └──────────────┘       └──────────────┘               └──────────────┘
//!                               │                              │
//!                               ▼                              ▼
//!                        Docker Hub API              RetentionPolicy (core)
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod api;
mod client;
mod config;
mod error;
pub mod pagination;
mod report;
mod sweep;

pub use client::{HubClient, HubSession};
pub use config::{RegistryConfig, DEFAULT_REPOSITORY_PAGE_SIZE, DEFAULT_TIMEOUT, DOCKER_HUB_URL};
pub use error::HubError;
pub use pagination::{PageRequest, PaginationStrategy, TagCursor, TagPage, DEFAULT_PAGE_SIZE};
pub use report::{RepositoryReport, SweepReport, TagAction, TagOutcome};
pub use sweep::{
    resolve_repositories, NoopObserver, SweepObserver, SweepOptions, Sweeper, TagRegistry,
};
