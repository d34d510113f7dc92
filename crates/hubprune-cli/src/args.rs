//! Command-line arguments and their resolution into run settings.
//!
//! Every option can also come from an environment variable; a flag on the
//! command line wins over the environment.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::builder::NonEmptyStringValueParser;
use clap::Parser;

use hubprune_core::{Credentials, RepositoryId, RetentionPolicy, DEFAULT_THRESHOLD_DAYS};
use hubprune_registry::{
    PaginationStrategy, RegistryConfig, SweepOptions, DEFAULT_PAGE_SIZE,
    DEFAULT_REPOSITORY_PAGE_SIZE, DEFAULT_TIMEOUT, DOCKER_HUB_URL,
};

/// hubprune - Deletes Docker Hub tags older than a number of days
#[derive(Parser, Debug)]
#[command(name = "hubprune")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Docker Hub account name
    #[arg(long, env = "DOCKER_HUB_USERNAME", value_parser = non_blank)]
    pub username: String,

    /// Docker Hub password or personal access token
    #[arg(
        long,
        env = "DOCKER_HUB_PASSWORD",
        hide_env_values = true,
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub password: String,

    /// Comma-separated `namespace/name` list; every repository of the account when empty
    #[arg(long, env = "REPOSITORY", default_value = "")]
    pub repository: String,

    /// Delete tags strictly older than this many days
    #[arg(long, env = "DELETE_OLDER_THAN_IN_DAYS", default_value_t = DEFAULT_THRESHOLD_DAYS)]
    pub older_in_days: u32,

    /// Regular expression; old tags whose name matches it anywhere are kept
    #[arg(long, env = "EXCLUDE_TAGS", default_value = "")]
    pub exclude_tags: String,

    /// Tags requested per listing page
    #[arg(
        long,
        env = "DEFAULT_PAGE_SIZE",
        default_value_t = DEFAULT_PAGE_SIZE,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub page_size: u32,

    /// Repositories requested in the single enumeration call
    #[arg(
        long,
        env = "REPOSITORY_PAGE_SIZE",
        default_value_t = DEFAULT_REPOSITORY_PAGE_SIZE,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub repository_page_size: u32,

    /// How to walk tag pages
    #[arg(long, env = "PAGINATION", value_enum, default_value_t = PaginationArg::PageNumber)]
    pub pagination: PaginationArg,

    /// Per-request timeout in seconds
    #[arg(
        long,
        env = "REQUEST_TIMEOUT_SECONDS",
        default_value_t = DEFAULT_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub request_timeout: u64,

    /// Registry base URL
    #[arg(long, env = "DOCKER_HUB_URL", default_value = DOCKER_HUB_URL)]
    pub registry_url: String,

    /// Report what would be deleted without deleting anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Pagination strategy as named on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PaginationArg {
    /// Read the tag count, then request numbered pages from last to first
    #[default]
    PageNumber,
    /// Follow the `next` link of each page
    Cursor,
}

impl From<PaginationArg> for PaginationStrategy {
    fn from(arg: PaginationArg) -> Self {
        match arg {
            PaginationArg::PageNumber => Self::PageNumber,
            PaginationArg::Cursor => Self::Cursor,
        }
    }
}

/// Everything a run needs, validated before any network call.
#[derive(Debug)]
pub struct Settings {
    /// Login username and password.
    pub credentials: Credentials,
    /// Age threshold and exclude pattern.
    pub policy: RetentionPolicy,
    /// Client configuration.
    pub registry: RegistryConfig,
    /// Pagination, page size and dry-run mode.
    pub options: SweepOptions,
    /// Explicit repositories; empty means enumerate the account.
    pub repositories: Vec<RepositoryId>,
}

impl Cli {
    /// Validates the arguments and builds the run settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are blank, the exclude pattern
    /// does not compile, or a repository entry is not `namespace/name`.
    pub fn settings(&self) -> Result<Settings> {
        let credentials = Credentials::new(self.username.as_str(), self.password.as_str())
            .context("Invalid credentials")?;

        let policy = RetentionPolicy::new(self.older_in_days, &self.exclude_tags)
            .context("Invalid --exclude-tags pattern")?;

        let repositories =
            RepositoryId::parse_list(&self.repository).context("Invalid --repository list")?;

        let registry = RegistryConfig::new(self.registry_url.as_str())
            .with_timeout(Duration::from_secs(self.request_timeout))
            .with_repository_page_size(self.repository_page_size);

        let options = SweepOptions::default()
            .with_strategy(self.pagination.into())
            .with_page_size(self.page_size)
            .with_dry_run(self.dry_run);

        Ok(Settings {
            credentials,
            policy,
            registry,
            options,
            repositories,
        })
    }
}

/// Accepts any value with at least one non-whitespace character.
fn non_blank(value: &str) -> std::result::Result<String, String> {
    if value.trim().is_empty() {
        return Err("must not be blank".to_string());
    }
    Ok(value.to_string())
}
