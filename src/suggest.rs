//! Search-as-you-type suggestions.
//!
//! [`SuggestionResolver`] turns keystrokes into at most one search request
//! per quiet period. It keeps two pieces of state:
//!
//! - the handle of the pending debounce task, aborted on every new input;
//! - a monotonically increasing token, bumped on every input or pick.
//!
//! A lookup only writes its candidates if its token is still the latest one
//! at the moment of writing, so a slow response for an old query can never
//! overwrite state produced for a newer one. Lookup failures are logged and
//! otherwise ignored; the previous candidate list stays in place.
//!
//! One resolver belongs to one input field for its whole lifetime. Creating a
//! new one per keystroke would defeat the debounce.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::{fetch_as, DirectoryClient, Endpoints};
use crate::config::Config;
use crate::models::{Candidate, SearchResponse};
use crate::state::ViewStateHolder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestSettings {
    pub min_query_len: usize,
    pub quiet_period: Duration,
    pub limit: usize,
}

impl From<&Config> for SuggestSettings {
    fn from(config: &Config) -> Self {
        SuggestSettings {
            min_query_len: config.min_query_len,
            quiet_period: config.quiet_period,
            limit: config.suggestion_limit,
        }
    }
}

pub struct SuggestionResolver<C: ?Sized> {
    client: Arc<C>,
    endpoints: Endpoints,
    state: ViewStateHolder,
    settings: SuggestSettings,
    latest: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<C> SuggestionResolver<C>
where
    C: DirectoryClient + ?Sized + 'static,
{
    pub fn new(
        client: Arc<C>,
        endpoints: Endpoints,
        state: ViewStateHolder,
        settings: SuggestSettings,
    ) -> Self {
        SuggestionResolver {
            client,
            endpoints,
            state,
            settings,
            latest: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
        }
    }

    /// Handles a change of the input text.
    ///
    /// Short inputs clear the candidates immediately and never schedule a
    /// request. Anything else (re)starts the quiet period. Must be called
    /// from within a Tokio runtime.
    pub fn on_input(&self, input: &str) {
        let token = self.supersede();

        if input.chars().count() < self.settings.min_query_len {
            self.state.clear_candidates();
            return;
        }

        let lookup = Lookup {
            client: Arc::clone(&self.client),
            url: self
                .endpoints
                .search_users(input, self.settings.limit)
                .to_string(),
            query: input.to_string(),
            state: self.state.clone(),
            latest: Arc::clone(&self.latest),
            token,
            limit: self.settings.limit,
        };
        let quiet_period = self.settings.quiet_period;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            lookup.run().await;
        });
        self.replace_pending(Some(handle));
    }

    /// Puts a picked candidate into the query and drops the suggestion list.
    /// No lookup is scheduled for this change.
    pub fn pick(&self, identifier: &str) {
        self.supersede();
        self.state.set_query(identifier);
        self.state.clear_candidates();
    }

    /// Invalidates every earlier lookup and returns the new token.
    fn supersede(&self) -> u64 {
        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.replace_pending(None);
        token
    }

    fn replace_pending(&self, next: Option<JoinHandle<()>>) {
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = next;
    }
}

impl<C: ?Sized> Drop for SuggestionResolver<C> {
    fn drop(&mut self) {
        let pending = self
            .pending
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}

/// One dispatched search, tagged with the token that was current when it
/// was scheduled.
struct Lookup<C: ?Sized> {
    client: Arc<C>,
    url: String,
    query: String,
    state: ViewStateHolder,
    latest: Arc<AtomicU64>,
    token: u64,
    limit: usize,
}

impl<C> Lookup<C>
where
    C: DirectoryClient + ?Sized,
{
    async fn run(self) {
        if !self.is_current() {
            return;
        }
        debug!(query = %self.query, token = self.token, "fetching suggestions");

        match fetch_as::<SearchResponse, C>(&*self.client, &self.url).await {
            Ok(response) => {
                let candidates: Vec<Candidate> = response
                    .items
                    .into_iter()
                    .take(self.limit)
                    .map(Candidate::from)
                    .collect();
                let latest = Arc::clone(&self.latest);
                let token = self.token;
                let applied = self.state.set_candidates_if(candidates, || {
                    latest.load(Ordering::SeqCst) == token
                });
                if !applied {
                    debug!(query = %self.query, "discarding stale suggestions");
                }
            }
            Err(err) => {
                warn!(query = %self.query, error = %err, "Error fetching suggestions");
            }
        }
    }

    fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{search_json, search_url, ScriptedDirectory};

    #[test]
    fn settings_follow_config() {
        let settings = SuggestSettings::from(&Config::default());
        assert_eq!(settings.min_query_len, 3);
        assert_eq!(settings.quiet_period, Duration::from_millis(200));
        assert_eq!(settings.limit, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_result_is_dropped_once_superseded() {
        let directory = Arc::new(ScriptedDirectory::new());
        directory.respond_after(
            search_url("octo"),
            Duration::from_millis(500),
            search_json(&["octocat"]),
        );
        let state = ViewStateHolder::new();
        let latest = Arc::new(AtomicU64::new(1));

        let lookup = Lookup {
            client: Arc::clone(&directory),
            url: search_url("octo"),
            query: "octo".into(),
            state: state.clone(),
            latest: Arc::clone(&latest),
            token: 1,
            limit: 5,
        };
        let task = tokio::spawn(lookup.run());

        tokio::time::sleep(Duration::from_millis(100)).await;
        latest.store(2, Ordering::SeqCst);
        task.await.unwrap();

        assert_eq!(directory.calls().len(), 1);
        assert!(state.snapshot().candidates.is_empty());
    }

    #[tokio::test]
    async fn superseded_lookup_is_never_dispatched() {
        let directory = Arc::new(ScriptedDirectory::new());
        let state = ViewStateHolder::new();

        Lookup {
            client: Arc::clone(&directory),
            url: search_url("octo"),
            query: "octo".into(),
            state: state.clone(),
            latest: Arc::new(AtomicU64::new(7)),
            token: 6,
            limit: 5,
        }
        .run()
        .await;

        assert!(directory.calls().is_empty());
    }
}
