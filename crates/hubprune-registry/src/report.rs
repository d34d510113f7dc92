//! Per-tag outcomes and run summaries produced by the sweeper.

use hubprune_core::RepositoryId;

/// What happened to one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagAction {
    /// The delete call succeeded.
    Deleted,
    /// The tag was eligible, but the run is a dry run.
    WouldDelete,
    /// Old enough, but protected by the exclude pattern.
    Skipped,
    /// Not old enough.
    Retained,
    /// The delete call failed.
    DeleteFailed {
        /// Upstream HTTP status, if any.
        status: Option<u16>,
        /// Error message.
        message: String,
    },
    /// The tag's timestamp could not be read, so it was left alone.
    Unreadable {
        /// Error message.
        message: String,
    },
}

/// Outcome for a single tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOutcome {
    /// Tag name.
    pub tag: String,
    /// Age in days, when the timestamp could be parsed.
    pub age_days: Option<i64>,
    /// What happened.
    pub action: TagAction,
}

/// Summary of one repository's sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryReport {
    /// The repository swept.
    pub repository: RepositoryId,
    /// Pages fetched and processed.
    pub pages: u64,
    /// Tags deleted (or that would be deleted in a dry run).
    pub deleted: usize,
    /// Tags protected by the exclude pattern.
    pub skipped: usize,
    /// Tags younger than the threshold.
    pub retained: usize,
    /// Tags whose delete call failed.
    pub failed: usize,
    /// Tags with an unreadable timestamp.
    pub unreadable: usize,
    /// Listing error that stopped this repository early.
    pub error: Option<String>,
}

impl RepositoryReport {
    /// Creates an empty report for a repository.
    #[must_use]
    pub const fn new(repository: RepositoryId) -> Self {
        Self {
            repository,
            pages: 0,
            deleted: 0,
            skipped: 0,
            retained: 0,
            failed: 0,
            unreadable: 0,
            error: None,
        }
    }

    /// Counts an outcome.
    pub fn record(&mut self, outcome: &TagOutcome) {
        match outcome.action {
            TagAction::Deleted | TagAction::WouldDelete => self.deleted += 1,
            TagAction::Skipped => self.skipped += 1,
            TagAction::Retained => self.retained += 1,
            TagAction::DeleteFailed { .. } => self.failed += 1,
            TagAction::Unreadable { .. } => self.unreadable += 1,
        }
    }

    /// Returns true if a listing or delete call failed.
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.error.is_some() || self.failed > 0
    }
}

/// Summary of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// One entry per repository, in processing order.
    pub repositories: Vec<RepositoryReport>,
}

impl SweepReport {
    /// Total tags deleted across all repositories.
    #[must_use]
    pub fn deleted(&self) -> usize {
        self.repositories.iter().map(|r| r.deleted).sum()
    }

    /// Total tags skipped by the exclude pattern.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.repositories.iter().map(|r| r.skipped).sum()
    }

    /// Total failed delete calls.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.repositories.iter().map(|r| r.failed).sum()
    }

    /// Repositories whose listing failed.
    pub fn failed_repositories(&self) -> impl Iterator<Item = &RepositoryReport> {
        self.repositories.iter().filter(|r| r.error.is_some())
    }

    /// Returns true if any repository reported a failure.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.repositories.iter().any(RepositoryReport::has_failures)
    }
}
