//! Runtime settings for the directory client and the suggestion resolver.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = "rust-github-profile-client";
pub const DEFAULT_MIN_QUERY_LEN: usize = 3;
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(200);
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the directory API; endpoints are resolved against it.
    pub api_base: Url,
    pub user_agent: String,
    /// Inputs shorter than this (in chars) never reach the search endpoint.
    pub min_query_len: usize,
    /// Debounce window for search-as-you-type.
    pub quiet_period: Duration,
    pub suggestion_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base: Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            quiet_period: DEFAULT_QUIET_PERIOD,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

impl Config {
    /// Builds a config from the process environment, falling back to defaults.
    ///
    /// Recognised variables: `GITHUB_API_URL`, `GITHUB_USER_AGENT`,
    /// `PROFILE_DEBOUNCE_MS`, `PROFILE_MIN_QUERY_LEN`, `PROFILE_SUGGESTION_LIMIT`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok().filter(|v| !v.is_empty()))
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(base) = lookup("GITHUB_API_URL") {
            config = config.with_api_base(&base)?;
        }
        if let Some(agent) = lookup("GITHUB_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(ms) = lookup("PROFILE_DEBOUNCE_MS") {
            let ms: u64 = ms
                .parse()
                .with_context(|| format!("PROFILE_DEBOUNCE_MS is not a number: {ms}"))?;
            config.quiet_period = Duration::from_millis(ms);
        }
        if let Some(len) = lookup("PROFILE_MIN_QUERY_LEN") {
            config.min_query_len = len
                .parse()
                .with_context(|| format!("PROFILE_MIN_QUERY_LEN is not a number: {len}"))?;
        }
        if let Some(limit) = lookup("PROFILE_SUGGESTION_LIMIT") {
            config.suggestion_limit = limit
                .parse()
                .with_context(|| format!("PROFILE_SUGGESTION_LIMIT is not a number: {limit}"))?;
        }

        Ok(config)
    }

    /// Replaces the API base. A trailing slash is enforced so relative
    /// endpoint paths join underneath it rather than replacing its last segment.
    pub fn with_api_base(mut self, base: &str) -> Result<Self> {
        let normalized = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{base}/")
        };
        let url =
            Url::parse(&normalized).with_context(|| format!("Invalid API base URL: {base}"))?;
        if url.cannot_be_a_base() {
            anyhow::bail!("API base URL cannot hold a path: {base}");
        }
        self.api_base = url;
        Ok(self)
    }
}
