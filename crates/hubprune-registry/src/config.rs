//! Configuration types for the registry client.

use std::time::Duration;

/// Base URL of the public Docker Hub API.
pub const DOCKER_HUB_URL: &str = "https://hub.docker.com";

/// Page size used to list an account's repositories in one call.
pub const DEFAULT_REPOSITORY_PAGE_SIZE: u32 = 10_000;

/// Default timeout applied to every outbound request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the registry client.
///
/// Built once at startup and handed to [`HubClient::new`](crate::HubClient::new).
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Registry API base URL (e.g., "<https://hub.docker.com>").
    pub url: String,

    /// Request timeout.
    pub timeout: Duration,

    /// Page size for the repository enumeration call.
    pub repository_page_size: u32,

    /// User agent string.
    pub user_agent: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new(DOCKER_HUB_URL)
    }
}

impl RegistryConfig {
    /// Creates a new registry configuration with the given URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use hubprune_registry::RegistryConfig;
    ///
    /// let config = RegistryConfig::new("https://hub.docker.com/");
    /// assert_eq!(config.url, "https://hub.docker.com");
    /// ```
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            url: url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            repository_page_size: DEFAULT_REPOSITORY_PAGE_SIZE,
            user_agent: format!("hubprune/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the page size for repository enumeration.
    #[must_use]
    pub const fn with_repository_page_size(mut self, page_size: u32) -> Self {
        self.repository_page_size = page_size;
        self
    }
}
