//! The prune loop.
//!
//! A [`Sweeper`] walks every page of tags of each repository, runs the
//! retention filter on each tag, and deletes the eligible ones. Calls are
//! strictly sequential. Failures are contained:
//!
//! - a listing failure ends that repository, and the next one still runs;
//! - a delete failure is reported and the sweep moves on to the next tag;
//! - an unreadable timestamp is reported and the tag is left alone.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hubprune_core::{Decision, RepositoryId, RetentionPolicy, TagRecord};

use crate::error::HubError;
use crate::pagination::{
    descending_pages, total_pages, PageRequest, PaginationStrategy, TagCursor, TagPage,
    DEFAULT_PAGE_SIZE,
};
use crate::report::{RepositoryReport, SweepReport, TagAction, TagOutcome};

/// Registry operations the sweeper needs.
///
/// Implemented by [`HubSession`](crate::HubSession) over HTTP.
#[async_trait]
pub trait TagRegistry: Send + Sync {
    /// Lists all repositories owned by an account.
    async fn list_repositories(&self, owner: &str) -> Result<Vec<RepositoryId>, HubError>;

    /// Fetches one page of tags by page size and optional page number.
    async fn list_tags_page(
        &self,
        repository: &RepositoryId,
        request: PageRequest,
    ) -> Result<TagPage, HubError>;

    /// Fetches the page a `next` cursor points at.
    async fn list_tags_at(
        &self,
        repository: &RepositoryId,
        cursor: &TagCursor,
    ) -> Result<TagPage, HubError>;

    /// Deletes one tag.
    async fn delete_tag(&self, repository: &RepositoryId, tag: &str) -> Result<(), HubError>;
}

/// Receives progress notifications during a sweep.
///
/// All methods default to doing nothing.
pub trait SweepObserver {
    /// A repository is about to be processed.
    fn repository_started(&mut self, _repository: &RepositoryId, _threshold_days: u32) {}

    /// A tag has been evaluated and acted upon.
    fn tag_processed(&mut self, _repository: &RepositoryId, _outcome: &TagOutcome) {}

    /// A numbered page has been fully processed.
    fn page_processed(&mut self, _repository: &RepositoryId, _page: u64) {}

    /// A repository's traversal stopped on a listing error.
    fn repository_failed(&mut self, _repository: &RepositoryId, _error: &HubError) {}

    /// A repository is done, successfully or not.
    fn repository_finished(&mut self, _report: &RepositoryReport) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SweepObserver for NoopObserver {}

/// Run-wide settings for a sweep.
#[derive(Debug, Clone)]
pub struct SweepOptions {
    /// Pagination strategy for every repository in the run.
    pub strategy: PaginationStrategy,
    /// Tags requested per page.
    pub page_size: u32,
    /// The instant ages are measured against.
    pub now: DateTime<Utc>,
    /// Evaluate and report without deleting.
    pub dry_run: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            strategy: PaginationStrategy::default(),
            page_size: DEFAULT_PAGE_SIZE,
            now: Utc::now(),
            dry_run: false,
        }
    }
}

impl SweepOptions {
    /// Sets the pagination strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: PaginationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Fixes the reference time.
    #[must_use]
    pub const fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Enables or disables dry-run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Returns the explicit repository list, or every repository of `owner`
/// when the list is empty.
///
/// # Errors
///
/// Returns the enumeration error when the list has to be fetched and the
/// call fails.
pub async fn resolve_repositories<R>(
    registry: &R,
    explicit: Vec<RepositoryId>,
    owner: &str,
) -> Result<Vec<RepositoryId>, HubError>
where
    R: TagRegistry + ?Sized,
{
    if !explicit.is_empty() {
        return Ok(explicit);
    }

    tracing::info!(owner, "No repositories given, enumerating account");
    registry.list_repositories(owner).await
}

/// Drives the list-evaluate-delete loop over a set of repositories.
#[derive(Debug)]
pub struct Sweeper<'a, R: ?Sized> {
    registry: &'a R,
    policy: &'a RetentionPolicy,
    options: SweepOptions,
}

impl<'a, R> Sweeper<'a, R>
where
    R: TagRegistry + ?Sized,
{
    /// Creates a sweeper.
    #[must_use]
    pub fn new(registry: &'a R, policy: &'a RetentionPolicy, options: SweepOptions) -> Self {
        Self {
            registry,
            policy,
            options: SweepOptions {
                page_size: options.page_size.max(1),
                ..options
            },
        }
    }

    /// Sweeps each repository in order.
    ///
    /// Never fails as a whole: per-repository errors are recorded in the
    /// returned report and passed to the observer.
    pub async fn run(
        &self,
        repositories: &[RepositoryId],
        observer: &mut dyn SweepObserver,
    ) -> SweepReport {
        let mut report = SweepReport::default();

        for repository in repositories {
            let repo_report = self.sweep_repository(repository, observer).await;
            observer.repository_finished(&repo_report);
            report.repositories.push(repo_report);
        }

        tracing::info!(
            repositories = report.repositories.len(),
            deleted = report.deleted(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Sweep finished"
        );

        report
    }

    /// Sweeps a single repository.
    pub async fn sweep_repository(
        &self,
        repository: &RepositoryId,
        observer: &mut dyn SweepObserver,
    ) -> RepositoryReport {
        let mut report = RepositoryReport::new(repository.clone());
        observer.repository_started(repository, self.policy.threshold_days());
        tracing::info!(
            repository = %repository,
            threshold_days = self.policy.threshold_days(),
            strategy = %self.options.strategy,
            "Processing repository"
        );

        let traversal = match self.options.strategy {
            PaginationStrategy::PageNumber => {
                self.walk_numbered(repository, &mut report, observer).await
            }
            PaginationStrategy::Cursor => {
                self.walk_cursor(repository, &mut report, observer).await
            }
        };

        if let Err(error) = traversal {
            tracing::error!(repository = %repository, error = %error, "Repository sweep aborted");
            observer.repository_failed(repository, &error);
            report.error = Some(error.to_string());
        }

        report
    }

    /// Reads the tag count from page 1, then walks pages from last to first.
    async fn walk_numbered(
        &self,
        repository: &RepositoryId,
        report: &mut RepositoryReport,
        observer: &mut dyn SweepObserver,
    ) -> Result<(), HubError> {
        let page_size = self.options.page_size;

        let first = self
            .registry
            .list_tags_page(repository, PageRequest::numbered(page_size, 1))
            .await?;
        let count = first.count.ok_or_else(|| HubError::MissingField {
            target: format!("tags of {repository}"),
            field: "count",
        })?;
        let pages = total_pages(count, page_size);
        tracing::debug!(repository = %repository, count, pages, "Counted tags");

        for page in descending_pages(pages) {
            let listing = self
                .registry
                .list_tags_page(repository, PageRequest::numbered(page_size, page))
                .await?;
            report.pages += 1;

            self.process_tags(repository, &listing.tags, report, observer)
                .await;
            observer.page_processed(repository, page);
        }

        Ok(())
    }

    /// Follows `next` cursors until the registry stops returning one.
    async fn walk_cursor(
        &self,
        repository: &RepositoryId,
        report: &mut RepositoryReport,
        observer: &mut dyn SweepObserver,
    ) -> Result<(), HubError> {
        let mut listing = self
            .registry
            .list_tags_page(repository, PageRequest::first(self.options.page_size))
            .await?;

        loop {
            report.pages += 1;
            self.process_tags(repository, &listing.tags, report, observer)
                .await;

            let Some(cursor) = listing.next.take() else {
                break;
            };
            listing = self.registry.list_tags_at(repository, &cursor).await?;
        }

        Ok(())
    }

    async fn process_tags(
        &self,
        repository: &RepositoryId,
        tags: &[TagRecord],
        report: &mut RepositoryReport,
        observer: &mut dyn SweepObserver,
    ) {
        for tag in tags {
            let outcome = self.process_tag(repository, tag).await;
            report.record(&outcome);
            observer.tag_processed(repository, &outcome);
        }
    }

    async fn process_tag(&self, repository: &RepositoryId, tag: &TagRecord) -> TagOutcome {
        let verdict = match self.policy.evaluate(tag, self.options.now) {
            Ok(verdict) => verdict,
            Err(error) => {
                tracing::warn!(
                    repository = %repository,
                    tag = %tag.name,
                    error = %error,
                    "Skipping tag"
                );
                return TagOutcome {
                    tag: tag.name.clone(),
                    age_days: None,
                    action: TagAction::Unreadable {
                        message: error.to_string(),
                    },
                };
            }
        };

        let action = match verdict.decision {
            Decision::Retain => {
                tracing::debug!(
                    repository = %repository,
                    tag = %tag.name,
                    age_days = verdict.age_days,
                    "Retained"
                );
                TagAction::Retained
            }
            Decision::Exclude => TagAction::Skipped,
            Decision::Delete if self.options.dry_run => TagAction::WouldDelete,
            Decision::Delete => match self.registry.delete_tag(repository, &tag.name).await {
                Ok(()) => TagAction::Deleted,
                Err(error) => {
                    tracing::error!(
                        repository = %repository,
                        tag = %tag.name,
                        error = %error,
                        "Delete failed"
                    );
                    TagAction::DeleteFailed {
                        status: error.status(),
                        message: error.to_string(),
                    }
                }
            },
        };

        TagOutcome {
            tag: tag.name.clone(),
            age_days: Some(verdict.age_days),
            action,
        }
    }
}
