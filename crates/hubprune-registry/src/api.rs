//! Docker Hub API response bodies.
//!
//! Only the fields the client consumes are modelled; everything else in the
//! responses is ignored. Required fields are `Option` so that their absence
//! surfaces as [`HubError::MissingField`] naming the field, rather than as an
//! opaque JSON error.

use hubprune_core::{RepositoryId, TagRecord};
use serde::Deserialize;

use crate::error::HubError;
use crate::pagination::{TagCursor, TagPage};

/// Body of a successful login.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: Option<String>,
}

/// One entry of the repository list.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RepositorySummary {
    pub namespace: String,
    pub name: String,
}

/// Body of the repository list call.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RepositoryList {
    #[serde(default)]
    pub results: Option<Vec<RepositorySummary>>,
}

impl RepositoryList {
    pub fn into_repositories(self, target: &str) -> Result<Vec<RepositoryId>, HubError> {
        let results = self.results.ok_or_else(|| HubError::MissingField {
            target: target.to_string(),
            field: "results",
        })?;

        results
            .into_iter()
            .map(|repo| RepositoryId::new(repo.namespace, repo.name).map_err(Into::into))
            .collect()
    }
}

/// Body of the tag list call.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TagList {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<TagRecord>>,
}

impl TagList {
    pub fn into_page(self, target: &str) -> Result<TagPage, HubError> {
        let tags = self.results.ok_or_else(|| HubError::MissingField {
            target: target.to_string(),
            field: "results",
        })?;

        Ok(TagPage {
            count: self.count,
            next: self.next.filter(|next| !next.is_empty()).map(TagCursor::new),
            tags,
        })
    }
}
