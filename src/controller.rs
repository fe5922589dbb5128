//! Entry point for renderer intents.
//!
//! A renderer owns one [`Controller`], forwards user intents to it and
//! redraws from [`Controller::state`] and [`Controller::theme`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::client::{DirectoryClient, Endpoints};
use crate::config::Config;
use crate::profile::ProfileAggregator;
use crate::state::ViewStateHolder;
use crate::suggest::{SuggestSettings, SuggestionResolver};
use crate::theme::{Theme, ThemeSignal};

pub struct Controller<C: ?Sized> {
    state: ViewStateHolder,
    theme: ThemeSignal,
    suggestions: SuggestionResolver<C>,
    aggregator: ProfileAggregator<C>,
    search_generation: Arc<AtomicU64>,
}

impl<C> Controller<C>
where
    C: DirectoryClient + ?Sized + 'static,
{
    pub fn new(client: Arc<C>, config: &Config) -> Self {
        let state = ViewStateHolder::new();
        let endpoints = Endpoints::new(config.api_base.clone());
        Controller {
            suggestions: SuggestionResolver::new(
                Arc::clone(&client),
                endpoints.clone(),
                state.clone(),
                SuggestSettings::from(config),
            ),
            aggregator: ProfileAggregator::new(client, endpoints),
            state,
            theme: ThemeSignal::default(),
            search_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn state(&self) -> &ViewStateHolder {
        &self.state
    }

    pub fn theme(&self) -> &ThemeSignal {
        &self.theme
    }

    /// The user edited the query text.
    pub fn on_query_changed(&self, text: &str) {
        self.state.set_query(text);
        self.suggestions.on_input(text);
    }

    /// The user picked a suggestion.
    pub fn on_suggestion_picked(&self, identifier: &str) {
        self.suggestions.pick(identifier);
    }

    /// The user confirmed the current query.
    ///
    /// Clears any previous error at once, then resolves the profile in the
    /// background. If another search is confirmed before this one settles,
    /// this one's outcome is dropped. The returned handle completes once the
    /// outcome has been applied or dropped.
    pub fn on_search_confirmed(&self) -> JoinHandle<()> {
        let generation = self.search_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let login = self.state.snapshot().query;
        self.state.begin_loading();

        let aggregator = self.aggregator.clone();
        let state = self.state.clone();
        let latest = Arc::clone(&self.search_generation);

        tokio::spawn(async move {
            let outcome = aggregator.resolve_profile(&login).await;
            let applied = state.set_outcome_if(outcome, || {
                latest.load(Ordering::SeqCst) == generation
            });
            if !applied {
                debug!(%login, generation, "discarding superseded profile result");
            }
        })
    }

    pub fn toggle_theme(&self) -> Theme {
        self.theme.toggle()
    }
}

impl Controller<dyn DirectoryClient> {
    /// Controller talking to the real directory described by `config`.
    pub fn connect(config: &Config) -> anyhow::Result<Self> {
        let client: Arc<dyn DirectoryClient> =
            Arc::new(crate::client::HttpDirectory::from_config(config)?);
        Ok(Controller::new(client, config))
    }
}

