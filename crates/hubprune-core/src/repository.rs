//! Repository identifiers and tag records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A repository identified as `namespace/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryId {
    namespace: String,
    name: String,
}

impl RepositoryId {
    /// Creates a repository identifier from its two parts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRepository`] if either part is empty or
    /// contains a `/`.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        let name = name.into();

        let valid = |part: &str| !part.is_empty() && !part.contains('/');
        if !valid(&namespace) || !valid(&name) {
            return Err(Error::InvalidRepository {
                value: format!("{namespace}/{name}"),
            });
        }

        Ok(Self { namespace, name })
    }

    /// Parses a comma-separated repository list, ignoring blank entries.
    ///
    /// # Errors
    ///
    /// Returns the first entry that is not a valid identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use hubprune_core::RepositoryId;
    ///
    /// let repos = RepositoryId::parse_list("acme/app, acme/worker,")?;
    /// assert_eq!(repos.len(), 2);
    /// assert_eq!(repos[1].to_string(), "acme/worker");
    /// # Ok::<(), hubprune_core::Error>(())
    /// ```
    pub fn parse_list(list: &str) -> Result<Vec<Self>> {
        list.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::parse)
            .collect()
    }

    /// Returns the namespace (account or organization).
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the repository name within its namespace.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for RepositoryId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let (namespace, name) = trimmed.split_once('/').ok_or_else(|| Error::InvalidRepository {
            value: trimmed.to_string(),
        })?;
        Self::new(namespace, name).map_err(|_| Error::InvalidRepository {
            value: trimmed.to_string(),
        })
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// A tag as returned by the tag listing endpoint.
///
/// Only the fields needed for retention decisions are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    /// Tag name.
    pub name: String,

    /// Last push time as sent by the registry (RFC 3339 in practice).
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl TagRecord {
    /// Creates a tag record.
    #[must_use]
    pub fn new(name: impl Into<String>, last_updated: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last_updated: Some(last_updated.into()),
        }
    }
}
