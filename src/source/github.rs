//! GitHub repository content source.
//!
//! Lists a repository subdirectory through the contents API and fetches raw
//! bytes through the raw host:
//!
//! - listing: `GET {api}/repos/{owner}/{repo}/contents/{path}?ref={branch}`
//! - fetch:   `GET {raw}/{owner}/{repo}/{branch}/{path}/{name}`
//!
//! Only entries with `type == "file"` and a supported extension are kept.
//! Any transport failure or non-2xx response surfaces as SourceUnavailable;
//! the user retries by re-navigating, never automatically.

use super::{validate_name, FileEntry};
use crate::errors::{PortalError, PortalResult};
use serde::Deserialize;
use std::time::Duration;

/// Default GitHub API endpoint.
const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default raw content endpoint.
const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";

/// Default timeout for API requests (in seconds).
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// One entry from the contents API. Fields other than these are ignored.
#[derive(Debug, Deserialize)]
struct ContentItem {
    name: String,
    #[serde(rename = "type")]
    item_type: String,
}

/// Client for one repository subdirectory.
#[derive(Debug, Clone)]
pub struct GithubSource {
    /// Repository owner (user or organization).
    owner: String,
    /// Repository name.
    repo: String,
    /// Branch to list against.
    branch: String,
    /// Subdirectory inside the repository holding the course files.
    path: String,
    /// Base URL for the contents API.
    api_base: String,
    /// Base URL for raw content.
    raw_base: String,
    /// HTTP client with configured timeout.
    client: reqwest::Client,
}

impl GithubSource {
    /// Create a source for `owner/repo` on `branch`, rooted at `path`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built, which only happens when the
    /// system TLS stack is broken. Acceptable for initialization code.
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("courseport/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client for GitHub source");

        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
            path: path.into(),
            api_base: DEFAULT_API_URL.to_string(),
            raw_base: DEFAULT_RAW_URL.to_string(),
            client,
        }
    }

    /// Override both endpoints. Used by tests to point at a stub upstream.
    pub fn with_base_urls(
        mut self,
        api_base: impl Into<String>,
        raw_base: impl Into<String>,
    ) -> Self {
        self.api_base = api_base.into();
        self.raw_base = raw_base.into();
        self
    }

    /// `owner/repo@branch:path`, for logs and status output.
    pub fn location(&self) -> String {
        format!(
            "{}/{}@{}:{}",
            self.owner, self.repo, self.branch, self.path
        )
    }

    /// List supported files in API response order.
    pub async fn list_files(&self) -> PortalResult<Vec<FileEntry>> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            self.api_base, self.owner, self.repo, self.path, self.branch
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PortalError::source_unavailable(format!("Listing request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(PortalError::source_unavailable(format!(
                "Listing returned HTTP {} for {}",
                response.status(),
                self.location()
            )));
        }

        let items: Vec<ContentItem> = response
            .json()
            .await
            .map_err(|e| PortalError::source_unavailable(format!("Malformed listing response: {}", e)))?;

        let files: Vec<FileEntry> = items
            .into_iter()
            .filter(|item| item.item_type == "file")
            .filter_map(|item| FileEntry::from_name(item.name))
            .collect();

        tracing::debug!(location = %self.location(), count = files.len(), "Listed remote files");
        Ok(files)
    }

    /// Fetch raw bytes for a listed name.
    pub async fn fetch(&self, name: &str) -> PortalResult<Vec<u8>> {
        validate_name(name)?;

        let url = format!(
            "{}/{}/{}/{}/{}/{}",
            self.raw_base, self.owner, self.repo, self.branch, self.path, name
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PortalError::source_unavailable(format!("Fetch request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(PortalError::source_unavailable(format!(
                "Fetch returned HTTP {} for {}",
                response.status(),
                name
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PortalError::source_unavailable(format!("Fetch body failed: {}", e)))?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_format() {
        let source = GithubSource::new("azaz6216", "cousrecontent", "main", "my-course/content");
        assert_eq!(source.location(), "azaz6216/cousrecontent@main:my-course/content");
    }

    #[test]
    fn test_base_url_override() {
        let source = GithubSource::new("o", "r", "main", "p")
            .with_base_urls("http://127.0.0.1:9/api", "http://127.0.0.1:9/raw");
        assert_eq!(source.api_base, "http://127.0.0.1:9/api");
        assert_eq!(source.raw_base, "http://127.0.0.1:9/raw");
    }

    #[tokio::test]
    async fn test_fetch_rejects_unlisted_names_up_front() {
        // Never reaches the network: traversal and unsupported names fail fast.
        let source = GithubSource::new("o", "r", "main", "p")
            .with_base_urls("http://127.0.0.1:9", "http://127.0.0.1:9");
        assert!(matches!(
            source.fetch("../x.pdf").await.unwrap_err(),
            PortalError::NotFound { .. }
        ));
        assert!(matches!(
            source.fetch("x.txt").await.unwrap_err(),
            PortalError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_source_unavailable() {
        // Port 9 (discard) is not listening; the connect fails immediately.
        let source = GithubSource::new("o", "r", "main", "p")
            .with_base_urls("http://127.0.0.1:9", "http://127.0.0.1:9");
        assert!(matches!(
            source.list_files().await.unwrap_err(),
            PortalError::SourceUnavailable { .. }
        ));
        assert!(matches!(
            source.fetch("x.pdf").await.unwrap_err(),
            PortalError::SourceUnavailable { .. }
        ));
    }
}
