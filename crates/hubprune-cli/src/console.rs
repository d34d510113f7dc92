//! Human-readable progress lines on stdout.

use std::fmt;
use std::io::Write;

use hubprune_core::RepositoryId;
use hubprune_registry::{
    HubError, RepositoryReport, SweepObserver, SweepReport, TagAction, TagOutcome,
};

/// Prints one line per notable sweep event.
pub struct Console<W: Write> {
    out: W,
    dry_run: bool,
}

impl<W: Write> Console<W> {
    /// Creates a console writing to `out`.
    pub const fn new(out: W, dry_run: bool) -> Self {
        Self { out, dry_run }
    }

    /// Prints the run totals.
    pub fn summary(&mut self, report: &SweepReport) {
        let verb = if self.dry_run {
            "Would delete"
        } else {
            "Deleted"
        };
        self.line(format_args!(
            "{verb} {} tags, skipped {}, {} deletions failed across {} repositories.",
            report.deleted(),
            report.skipped(),
            report.failed(),
            report.repositories.len()
        ));

        let failed: Vec<String> = report
            .failed_repositories()
            .map(|r| r.repository.to_string())
            .collect();
        if !failed.is_empty() {
            self.line(format_args!(
                "Repositories that could not be processed: {}",
                failed.join(", ")
            ));
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, line: fmt::Arguments<'_>) {
        if let Err(error) = writeln!(self.out, "{line}") {
            tracing::warn!(error = %error, "Failed to write to console");
        }
    }
}

impl<W: Write> SweepObserver for Console<W> {
    fn repository_started(&mut self, repository: &RepositoryId, threshold_days: u32) {
        self.line(format_args!(
            "Processing {repository}: deleting tags older than {threshold_days} days."
        ));
    }

    fn tag_processed(&mut self, _repository: &RepositoryId, outcome: &TagOutcome) {
        let tag = &outcome.tag;
        let age = outcome.age_days.unwrap_or_default();

        match &outcome.action {
            TagAction::Deleted => {
                self.line(format_args!("Deleted tag {tag} that is {age} days old."));
            }
            TagAction::WouldDelete => {
                self.line(format_args!("Would delete tag {tag} that is {age} days old."));
            }
            TagAction::Skipped => {
                self.line(format_args!("Skipped tag {tag} that is {age} days old."));
            }
            TagAction::DeleteFailed { message, .. } => {
                self.line(format_args!(
                    "Failed to delete tag {tag} that is {age} days old: {message}"
                ));
            }
            TagAction::Unreadable { message } => {
                self.line(format_args!("Ignored tag {tag}: {message}"));
            }
            TagAction::Retained => {}
        }
    }

    fn page_processed(&mut self, _repository: &RepositoryId, page: u64) {
        self.line(format_args!("Page {page} processed!"));
    }

    fn repository_failed(&mut self, repository: &RepositoryId, error: &HubError) {
        self.line(format_args!("Stopped processing {repository}: {error}"));
    }

    fn repository_finished(&mut self, report: &RepositoryReport) {
        if report.error.is_none() {
            self.line(format_args!(
                "Finished {}: {} deleted, {} skipped.",
                report.repository, report.deleted, report.skipped
            ));
        }
    }
}
