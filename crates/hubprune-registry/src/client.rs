//! Docker Hub API client.
//!
//! [`HubClient`] performs the login exchange and yields a [`HubSession`]
//! that carries the bearer token for every later call. A session is created
//! exactly once per run and the token is never refreshed.

use async_trait::async_trait;
use hubprune_core::{Credentials, RepositoryId};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Response;
use url::Url;

use crate::api::{LoginResponse, RepositoryList, TagList};
use crate::config::RegistryConfig;
use crate::error::HubError;
use crate::pagination::{PageRequest, TagCursor, TagPage};
use crate::sweep::TagRegistry;

/// Unauthenticated client for the registry API.
#[derive(Debug)]
pub struct HubClient {
    config: RegistryConfig,
    base: Url,
    http: reqwest::Client,
}

impl HubClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be
    /// created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use hubprune_registry::{HubClient, RegistryConfig};
    ///
    /// let client = HubClient::new(RegistryConfig::default())?;
    /// # Ok::<(), hubprune_registry::HubError>(())
    /// ```
    pub fn new(config: RegistryConfig) -> Result<Self, HubError> {
        let base = Url::parse(&config.url).map_err(|_| HubError::InvalidUrl {
            url: config.url.clone(),
        })?;
        if base.cannot_be_a_base() {
            return Err(HubError::InvalidUrl {
                url: config.url.clone(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| HubError::ConnectionFailed {
                url: config.url.clone(),
                source: e,
            })?;

        Ok(Self { config, base, http })
    }

    /// Exchanges credentials for a bearer token.
    ///
    /// Consumes the client so that a run authenticates exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::AuthenticationFailed`] on a non-2xx response or a
    /// token that cannot be sent as a header, and [`HubError::MissingField`]
    /// if the body has no `token`.
    pub async fn login(self, credentials: &Credentials) -> Result<HubSession, HubError> {
        let url = endpoint(&self.base, &["v2", "users", "login", ""])?;
        tracing::debug!(username = credentials.username(), "Logging in");

        let response = self
            .http
            .post(url)
            .form(&[
                ("username", credentials.username()),
                ("password", credentials.password()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = failure(response).await;
            tracing::error!(status, "Login rejected");
            return Err(HubError::AuthenticationFailed { status, message });
        }

        let status = response.status();
        let body: LoginResponse = response.json().await?;
        let token = body.token.ok_or_else(|| HubError::MissingField {
            target: "login".to_string(),
            field: "token",
        })?;
        let authorization = bearer_header(&token).ok_or_else(|| {
            tracing::error!("Login returned a token that is not a valid header value");
            HubError::AuthenticationFailed {
                status: status.as_u16(),
                message: "Token contains characters not allowed in a header".to_string(),
            }
        })?;

        tracing::info!(username = credentials.username(), "Authenticated");

        Ok(HubSession {
            config: self.config,
            base: self.base,
            http: self.http,
            authorization,
        })
    }
}

/// Authenticated registry session.
///
/// The `Authorization` header is marked sensitive, so `Debug` output never
/// shows the token.
#[derive(Debug)]
pub struct HubSession {
    config: RegistryConfig,
    base: Url,
    http: reqwest::Client,
    authorization: HeaderValue,
}

impl HubSession {
    /// Lists every repository owned by `owner` in a single request.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::ListingFailed`] on a non-2xx response.
    pub async fn list_repositories(&self, owner: &str) -> Result<Vec<RepositoryId>, HubError> {
        let target = format!("repositories of {owner}");
        let mut url = endpoint(&self.base, &["v2", "repositories", owner, ""])?;
        url.query_pairs_mut()
            .append_pair("page_size", &self.config.repository_page_size.to_string());

        let response = self.get(url, &target).await?;
        let body: RepositoryList = response.json().await?;
        let repositories = body.into_repositories(&target)?;

        tracing::info!(owner, count = repositories.len(), "Enumerated repositories");
        Ok(repositories)
    }

    /// Fetches one page of tags by page size and optional page number.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::ListingFailed`] on a non-2xx response and
    /// [`HubError::MissingField`] if the body has no `results`.
    pub async fn list_tags_page(
        &self,
        repository: &RepositoryId,
        request: PageRequest,
    ) -> Result<TagPage, HubError> {
        let mut url = endpoint(
            &self.base,
            &["v2", "repositories", repository.namespace(), repository.name(), "tags"],
        )?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page_size", &request.page_size.to_string());
            if let Some(page) = request.page {
                query.append_pair("page", &page.to_string());
            }
        }

        self.fetch_tags(url, repository).await
    }

    /// Fetches the page a cursor points at.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidUrl`] if the cursor is not a URL,
    /// [`HubError::ForeignCursor`] if it points outside the registry's origin,
    /// otherwise the same errors as [`HubSession::list_tags_page`].
    pub async fn list_tags_at(
        &self,
        repository: &RepositoryId,
        cursor: &TagCursor,
    ) -> Result<TagPage, HubError> {
        let url = self.base.join(cursor.as_str()).map_err(|_| HubError::InvalidUrl {
            url: cursor.to_string(),
        })?;
        if url.origin() != self.base.origin() {
            tracing::warn!(
                repository = %repository,
                cursor = %url,
                "Cursor leaves the registry origin"
            );
            return Err(HubError::ForeignCursor {
                url: url.to_string(),
            });
        }

        self.fetch_tags(url, repository).await
    }

    /// Deletes one tag.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::DeletionFailed`] on a non-2xx response.
    pub async fn delete_tag(&self, repository: &RepositoryId, tag: &str) -> Result<(), HubError> {
        let url = endpoint(
            &self.base,
            &["v2", "repositories", repository.namespace(), repository.name(), "tags", tag],
        )?;

        let response = self
            .http
            .delete(url)
            .headers(self.auth_headers())
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = failure(response).await;
            return Err(HubError::DeletionFailed {
                repository: repository.to_string(),
                tag: tag.to_string(),
                status,
                message,
            });
        }

        tracing::debug!(repository = %repository, tag, "Deleted tag");
        Ok(())
    }

    async fn fetch_tags(&self, url: Url, repository: &RepositoryId) -> Result<TagPage, HubError> {
        let target = format!("tags of {repository}");
        tracing::debug!(url = %url, "Listing tags");

        let response = self.get(url, &target).await?;
        let body: TagList = response.json().await?;
        body.into_page(&target)
    }

    async fn get(&self, url: Url, target: &str) -> Result<Response, HubError> {
        let response = self
            .http
            .get(url)
            .headers(self.auth_headers())
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = failure(response).await;
            return Err(HubError::ListingFailed {
                target: target.to_string(),
                status,
                message,
            });
        }

        Ok(response)
    }

    /// Creates the headers sent on every authenticated call.
    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.authorization.clone());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }
}

#[async_trait]
impl TagRegistry for HubSession {
    async fn list_repositories(&self, owner: &str) -> Result<Vec<RepositoryId>, HubError> {
        Self::list_repositories(self, owner).await
    }

    async fn list_tags_page(
        &self,
        repository: &RepositoryId,
        request: PageRequest,
    ) -> Result<TagPage, HubError> {
        Self::list_tags_page(self, repository, request).await
    }

    async fn list_tags_at(
        &self,
        repository: &RepositoryId,
        cursor: &TagCursor,
    ) -> Result<TagPage, HubError> {
        Self::list_tags_at(self, repository, cursor).await
    }

    async fn delete_tag(&self, repository: &RepositoryId, tag: &str) -> Result<(), HubError> {
        Self::delete_tag(self, repository, tag).await
    }
}

/// Builds a sensitive `Authorization: Bearer` value, or `None` if the token
/// holds bytes a header cannot carry.
fn bearer_header(token: &str) -> Option<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}")).ok()?;
    value.set_sensitive(true);
    Some(value)
}

/// Appends percent-encoded path segments to the base URL.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, HubError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| HubError::InvalidUrl {
            url: base.to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Extracts status and body text from a failed response.
async fn failure(response: Response) -> (u16, String) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.to_string()
    } else {
        body
    };
    (status.as_u16(), message)
}
