//! The contract between the core and whatever renders it.
//!
//! The core is the only writer; renderers call [`ViewStateHolder::subscribe`]
//! and redraw whenever the receiver reports a change.

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::AggregationError;
use crate::models::{Candidate, Profile};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub query: String,
    pub candidates: Vec<Candidate>,
    pub profile: Option<Profile>,
    pub error: Option<AggregationError>,
    /// An aggregation is in flight.
    pub loading: bool,
}

#[derive(Debug, Clone)]
pub struct ViewStateHolder {
    tx: Arc<watch::Sender<ViewState>>,
}

impl Default for ViewStateHolder {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewStateHolder {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ViewState::default());
        ViewStateHolder { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.tx.subscribe()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> ViewState {
        self.tx.borrow().clone()
    }

    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.tx.send_if_modified(|state| {
            if state.query == query {
                return false;
            }
            state.query = query;
            true
        });
    }

    pub fn set_candidates(&self, candidates: Vec<Candidate>) {
        self.tx.send_if_modified(|state| {
            if state.candidates == candidates {
                return false;
            }
            state.candidates = candidates;
            true
        });
    }

    pub fn clear_candidates(&self) {
        self.set_candidates(Vec::new());
    }

    /// Applies `candidates` only if `is_current` still holds at the moment of
    /// writing. Returns whether they were applied.
    pub(crate) fn set_candidates_if(
        &self,
        candidates: Vec<Candidate>,
        is_current: impl FnOnce() -> bool,
    ) -> bool {
        let mut applied = false;
        self.tx.send_if_modified(|state| {
            if !is_current() {
                return false;
            }
            applied = true;
            if state.candidates == candidates {
                return false;
            }
            state.candidates = candidates;
            true
        });
        applied
    }

    /// Start of an aggregation cycle: any previous error is dropped right away.
    pub fn begin_loading(&self) {
        self.tx.send_modify(|state| {
            state.error = None;
            state.loading = true;
        });
    }

    /// Stores the outcome of an aggregation cycle. Profile and error are
    /// mutually exclusive; a success replaces the previous profile wholesale.
    pub fn set_outcome(&self, outcome: Result<Profile, AggregationError>) {
        self.set_outcome_if(outcome, || true);
    }

    /// Like [`set_outcome`](Self::set_outcome), but dropped when `is_current`
    /// no longer holds at the moment of writing.
    pub(crate) fn set_outcome_if(
        &self,
        outcome: Result<Profile, AggregationError>,
        is_current: impl FnOnce() -> bool,
    ) -> bool {
        self.tx.send_if_modified(|state| {
            if !is_current() {
                return false;
            }
            state.loading = false;
            match outcome {
                Ok(profile) => {
                    state.profile = Some(profile);
                    state.error = None;
                }
                Err(err) => {
                    state.profile = None;
                    state.error = Some(err);
                }
            }
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(login: &str) -> Candidate {
        Candidate {
            identifier: login.into(),
            display_label: login.into(),
        }
    }

    #[test]
    fn begin_loading_clears_previous_error() {
        let holder = ViewStateHolder::new();
        holder.set_outcome(Err(AggregationError::transient("boom")));
        assert!(holder.snapshot().error.is_some());

        holder.begin_loading();
        let state = holder.snapshot();
        assert!(state.error.is_none());
        assert!(state.loading);
    }

    #[test]
    fn error_outcome_drops_profile() {
        let holder = ViewStateHolder::new();
        holder.set_outcome(Err(AggregationError::NotFound {
            login: "nobody".into(),
        }));
        let state = holder.snapshot();
        assert!(state.profile.is_none());
        assert!(!state.loading);
        assert!(state.error.as_ref().is_some_and(|e| e.is_not_found()));
    }

    #[test]
    fn guarded_candidates_respect_the_guard() {
        let holder = ViewStateHolder::new();
        assert!(!holder.set_candidates_if(vec![candidate("stale")], || false));
        assert!(holder.snapshot().candidates.is_empty());

        assert!(holder.set_candidates_if(vec![candidate("fresh")], || true));
        assert_eq!(holder.snapshot().candidates, vec![candidate("fresh")]);
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let holder = ViewStateHolder::new();
        let mut rx = holder.subscribe();

        holder.set_query("octo");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().query, "octo");

        // Same value again does not wake renderers.
        holder.set_query("octo");
        assert!(!rx.has_changed().unwrap());
    }
}
