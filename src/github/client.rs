// src/github/client.rs
// =============================================================================
// HTTP client construction for the GitHub REST API.
//
// Every request the deployer makes carries the same three headers:
// - Authorization: Bearer <GITHUB_TOKEN>
// - X-GitHub-Api-Version: 2022-11-28
// - Accept: application/vnd.github.v3+json
// so they are installed once as default headers on the reqwest Client.
// =============================================================================

use std::fmt;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use url::Url;

use crate::error::{DeployError, DeployResult};

/// Public GitHub API root
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// REST API version pinned for every request
pub const API_VERSION: &str = "2022-11-28";

const ACCEPT_JSON: &str = "application/vnd.github.v3+json";

// GitHub rejects requests without a User-Agent
const USER_AGENT: &str = concat!("docs-deploy/", env!("CARGO_PKG_VERSION"));

/// Connection settings for the hosting API
#[derive(Clone)]
pub struct ApiConfig {
    /// API root, e.g. https://api.github.com or https://ghe.example.com/api/v3
    pub base_url: Url,
    /// Bearer token
    pub token: String,
    /// Limit for connecting and for each JSON API call; None waits forever.
    /// Archive downloads only get the connect limit, since their size is
    /// unbounded.
    pub timeout: Option<Duration>,
}

impl ApiConfig {
    pub fn new(base_url: &str, token: impl Into<String>) -> DeployResult<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(DeployError::Url(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }

        Ok(Self {
            base_url,
            token: token.into(),
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Authenticated client for one API root
#[derive(Debug, Clone)]
pub struct GithubClient {
    pub(crate) http: Client,
    base_url: Url,
    api_timeout: Option<Duration>,
}

impl GithubClient {
    pub fn new(config: &ApiConfig) -> DeployResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-github-api-version"),
            HeaderValue::from_static(API_VERSION),
        );
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| DeployError::InvalidToken)?;
        // Keeps the token out of Debug output
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers);

        // A total timeout on the Client would also cut off large downloads
        if let Some(timeout) = config.timeout {
            builder = builder.connect_timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.clone(),
            api_timeout: config.timeout,
        })
    }

    // GET request for a JSON endpoint, bounded by the configured timeout
    pub(crate) fn api_get(&self, url: Url) -> RequestBuilder {
        let request = self.http.get(url);
        match self.api_timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    // Appends path segments to the API root
    //
    // Segments are percent-encoded by the url crate, so owner/repo names can't
    // inject extra path components.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> DeployResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DeployError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> GithubClient {
        GithubClient::new(&ApiConfig::new(base, "token").unwrap()).unwrap()
    }

    #[test]
    fn test_endpoint_on_api_root() {
        let url = client(DEFAULT_API_URL)
            .endpoint(&["repos", "oraNod", "ansible-documentation", "actions", "artifacts"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/oraNod/ansible-documentation/actions/artifacts"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let url = client("https://ghe.example.com/api/v3/")
            .endpoint(&["repos", "a", "b", "actions", "artifacts", "7"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/a/b/actions/artifacts/7"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let url = client(DEFAULT_API_URL).endpoint(&["repos", "a/../b", "c"]).unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/repos/a%2F..%2Fb/c");
    }

    #[test]
    fn test_token_with_newline_is_rejected() {
        let config = ApiConfig::new(DEFAULT_API_URL, "abc\ndef").unwrap();
        assert!(matches!(
            GithubClient::new(&config),
            Err(DeployError::InvalidToken)
        ));
    }

    #[test]
    fn test_debug_hides_token() {
        let config = ApiConfig::new(DEFAULT_API_URL, "ghp_secret").unwrap();
        assert!(!format!("{:?}", config).contains("ghp_secret"));
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(ApiConfig::new("mailto:someone@example.com", "t").is_err());
        assert!(ApiConfig::new("not a url", "t").is_err());
    }
}
