//! Test helpers: a scripted in-memory directory and JSON fixtures.
//!
//! Enabled for unit tests and, through the `test-utils` feature, for the
//! integration suites under `tests/`.

use std::sync::{Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::client::DirectoryClient;
use crate::config::Config;
use crate::error::HttpError;

pub const TEST_API_BASE: &str = "https://api.test/";

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests, once per process.
///
/// Uses `level` when given, otherwise `RUST_LOG` if set, otherwise stays silent.
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Config pointing at [`TEST_API_BASE`].
pub fn test_config() -> Config {
    Config::default()
        .with_api_base(TEST_API_BASE)
        .expect("test API base is valid")
}

#[derive(Debug, Clone)]
struct Route {
    url: String,
    delay: Duration,
    response: Result<Value, HttpError>,
}

/// A [`DirectoryClient`] answering from a script of exact-URL routes.
///
/// Unrouted URLs answer HTTP 404. Later routes for the same URL shadow
/// earlier ones. Every request is recorded, in dispatch order.
#[derive(Debug, Default)]
pub struct ScriptedDirectory {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: impl Into<String>, body: Value) -> &Self {
        self.route(url, Duration::ZERO, Ok(body))
    }

    pub fn respond_after(&self, url: impl Into<String>, delay: Duration, body: Value) -> &Self {
        self.route(url, delay, Ok(body))
    }

    pub fn fail(&self, url: impl Into<String>, err: HttpError) -> &Self {
        self.route(url, Duration::ZERO, Err(err))
    }

    pub fn fail_after(&self, url: impl Into<String>, delay: Duration, err: HttpError) -> &Self {
        self.route(url, delay, Err(err))
    }

    fn route(
        &self,
        url: impl Into<String>,
        delay: Duration,
        response: Result<Value, HttpError>,
    ) -> &Self {
        self.routes.lock().unwrap().push(Route {
            url: url.into(),
            delay,
            response,
        });
        self
    }

    /// Registers a user with `repos`, `followers` and `following` listing sizes.
    /// Listings are numbered from 1 so their order can be checked.
    pub fn mount_user(&self, login: &str, repos: usize, followers: usize, following: usize) {
        let base = format!("{TEST_API_BASE}users/{login}");
        self.respond(&base, user_json(login));
        self.respond(
            format!("{base}/repos"),
            Value::Array((1..=repos).map(|i| repo_json(i as u64, &format!("repo-{i}"))).collect()),
        );
        self.respond(
            format!("{base}/followers"),
            Value::Array(
                (1..=followers)
                    .map(|i| person_json(i as u64, &format!("follower-{i}")))
                    .collect(),
            ),
        );
        self.respond(
            format!("{base}/following"),
            Value::Array(
                (1..=following)
                    .map(|i| person_json(i as u64, &format!("followed-{i}")))
                    .collect(),
            ),
        );
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_containing(&self, needle: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|url| url.contains(needle))
            .collect()
    }
}

#[async_trait]
impl DirectoryClient for ScriptedDirectory {
    async fn fetch_resource(&self, url: &str) -> Result<Value, HttpError> {
        self.calls.lock().unwrap().push(url.to_string());

        let route = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|route| route.url == url)
            .cloned();

        let Some(route) = route else {
            return Err(HttpError::Status { status: 404 });
        };
        if !route.delay.is_zero() {
            tokio::time::sleep(route.delay).await;
        }
        route.response
    }
}

/// `/search/users` URL as built for `query` with the default page size.
pub fn search_url(query: &str) -> String {
    crate::client::Endpoints::new(test_config().api_base)
        .search_users(query, crate::config::DEFAULT_SUGGESTION_LIMIT)
        .to_string()
}

pub fn user_json(login: &str) -> Value {
    let base = format!("{TEST_API_BASE}users/{login}");
    json!({
        "login": login,
        "id": 583231,
        "avatar_url": format!("https://avatars.test/{login}"),
        "html_url": format!("https://github.test/{login}"),
        "name": "The Octocat",
        "bio": null,
        "location": "San Francisco",
        "company": null,
        "repos_url": format!("{base}/repos"),
        "followers_url": format!("{base}/followers"),
        "following_url": format!("{base}/following{{/other_user}}"),
    })
}

pub fn repo_json(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} description"),
        "html_url": format!("https://github.test/octocat/{name}"),
        "stargazers_count": id * 10,
        "forks_count": id,
    })
}

pub fn person_json(id: u64, login: &str) -> Value {
    json!({
        "id": id,
        "login": login,
        "html_url": format!("https://github.test/{login}"),
    })
}

/// A `/search/users` body listing `logins` in order.
pub fn search_json(logins: &[&str]) -> Value {
    let items: Vec<Value> = logins
        .iter()
        .enumerate()
        .map(|(i, login)| json!({ "id": i as u64 + 1, "login": login }))
        .collect();
    json!({ "total_count": items.len(), "incomplete_results": false, "items": items })
}
