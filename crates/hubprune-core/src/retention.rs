//! Age-based retention rules.
//!
//! A [`RetentionPolicy`] decides, for one [`TagRecord`] at a fixed point in
//! time, whether the tag should be deleted. The decision is a pure function:
//! no I/O happens here.

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;

use crate::error::{Error, Result};
use crate::repository::TagRecord;

/// Default retention threshold in days.
pub const DEFAULT_THRESHOLD_DAYS: u32 = 30;

/// Outcome of evaluating a tag against a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Older than the threshold and not protected: delete it.
    Delete,
    /// Older than the threshold but protected by the exclude pattern.
    Exclude,
    /// Not older than the threshold.
    Retain,
}

/// The decision for a tag together with the age it was based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Whole days elapsed since the tag's last update.
    pub age_days: i64,
    /// What to do with the tag.
    pub decision: Decision,
}

impl Verdict {
    /// Returns true if the tag should be deleted.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.decision == Decision::Delete
    }
}

/// Retention threshold and exclusion pattern, fixed for a run.
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    threshold_days: u32,
    exclude: Option<Regex>,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            threshold_days: DEFAULT_THRESHOLD_DAYS,
            exclude: None,
        }
    }
}

impl RetentionPolicy {
    /// Creates a policy from a threshold and an exclusion pattern.
    ///
    /// An empty pattern excludes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the pattern does not compile.
    ///
    /// # Examples
    ///
    /// ```
    /// use hubprune_core::RetentionPolicy;
    ///
    /// let policy = RetentionPolicy::new(30, "^release-")?;
    /// assert!(policy.is_excluded("release-1.0"));
    /// assert!(!policy.is_excluded("v1"));
    /// # Ok::<(), hubprune_core::Error>(())
    /// ```
    pub fn new(threshold_days: u32, exclude_pattern: &str) -> Result<Self> {
        let exclude = if exclude_pattern.is_empty() {
            None
        } else {
            Some(
                Regex::new(exclude_pattern).map_err(|source| Error::InvalidPattern {
                    pattern: exclude_pattern.to_string(),
                    source,
                })?,
            )
        };

        Ok(Self {
            threshold_days,
            exclude,
        })
    }

    /// Returns the threshold in days.
    #[must_use]
    pub const fn threshold_days(&self) -> u32 {
        self.threshold_days
    }

    /// Returns the exclusion pattern source, if one is set.
    #[must_use]
    pub fn exclude_pattern(&self) -> Option<&str> {
        self.exclude.as_ref().map(Regex::as_str)
    }

    /// Returns true if the tag name matches the exclusion pattern anywhere.
    #[must_use]
    pub fn is_excluded(&self, tag_name: &str) -> bool {
        self.exclude
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(tag_name))
    }

    /// Evaluates a tag against this policy as of `now`.
    ///
    /// The age is counted in whole days from the date part (first ten
    /// characters) of `last_updated` to the date of `now`. A tag is deleted
    /// only when its age is strictly greater than the threshold.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTimestamp`] if the timestamp is missing or
    /// does not start with a `YYYY-MM-DD` date.
    pub fn evaluate(&self, tag: &TagRecord, now: DateTime<Utc>) -> Result<Verdict> {
        let updated = parse_date(tag)?;
        let age_days = (now.date_naive() - updated).num_days();

        let decision = if age_days <= i64::from(self.threshold_days) {
            Decision::Retain
        } else if self.is_excluded(&tag.name) {
            Decision::Exclude
        } else {
            Decision::Delete
        };

        Ok(Verdict { age_days, decision })
    }
}

fn parse_date(tag: &TagRecord) -> Result<NaiveDate> {
    let invalid = || Error::InvalidTimestamp {
        tag: tag.name.clone(),
        value: tag.last_updated.clone(),
    };

    let raw = tag.last_updated.as_deref().ok_or_else(invalid)?;
    let date_part = raw.get(..10).ok_or_else(invalid)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| invalid())
}
