//! Remote directory client.
//!
//! Every network call in the crate goes through [`DirectoryClient::fetch_resource`]:
//! one GET, no retries, transport-default timeouts. Failures come back as a
//! classified [`HttpError`]; nothing here panics or retries.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::HttpError;

/// Issues a single GET against the directory and returns the parsed body.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    async fn fetch_resource(&self, url: &str) -> Result<Value, HttpError>;
}

/// Fetches `url` and decodes the body into `T`.
///
/// A body that parses as JSON but has the wrong shape is a [`HttpError::Decode`].
pub async fn fetch_as<T, C>(client: &C, url: &str) -> Result<T, HttpError>
where
    T: DeserializeOwned,
    C: DirectoryClient + ?Sized,
{
    let value = client.fetch_resource(url).await?;
    serde_json::from_value(value).map_err(|e| HttpError::Decode(format!("{url}: {e}")))
}

/// Creates a preconfigured HTTP client with required headers.
pub fn build_client(config: &Config) -> anyhow::Result<Client> {
    use anyhow::Context;

    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&config.user_agent).context("Invalid user agent value")?,
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github.v3+json"),
    );

    Client::builder()
        .default_headers(headers)
        .build()
        .context("Failed to build HTTP client")
}

/// [`DirectoryClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpDirectory {
    http: Client,
}

impl HttpDirectory {
    pub fn new(http: Client) -> Self {
        HttpDirectory { http }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(HttpDirectory::new(build_client(config)?))
    }
}

#[async_trait]
impl DirectoryClient for HttpDirectory {
    async fn fetch_resource(&self, url: &str) -> Result<Value, HttpError> {
        debug!(%url, "GET");

        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            debug!(%url, %status, "directory answered with an error status");
            return Err(HttpError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

/// Builds the two entry-point URLs of the directory API.
///
/// Dependent resources (repos, followers, following) are not built here;
/// their locators come from the primary user resource.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(base: Url) -> Self {
        Endpoints { base }
    }

    /// `{base}/users/{login}`, with `login` percent-encoded as a single segment.
    pub fn user(&self, login: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("users").push(login);
        }
        url
    }

    /// `{base}/search/users?q={query}&per_page={per_page}`.
    pub fn search_users(&self, query: &str, per_page: usize) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("search").push("users");
        }
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("per_page", &per_page.to_string());
        url
    }
}

/// Removes RFC 6570 `{...}` expressions from a resource locator, turning
/// e.g. `.../following{/other_user}` into `.../following`.
pub fn strip_uri_template(locator: &str) -> String {
    let mut out = String::with_capacity(locator.len());
    let mut depth = 0usize;
    for c in locator.chars() {
        match c {
            '{' => depth += 1,
            '}' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}
