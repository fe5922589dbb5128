//! Client-side lookup of GitHub users.
//!
//! Two paths share one [`client::DirectoryClient`]:
//!
//! - [`suggest::SuggestionResolver`] debounces keystrokes into search requests
//!   and keeps only the newest result;
//! - [`profile::ProfileAggregator`] resolves a login into a [`models::Profile`]
//!   made of the user resource plus its repositories, followers and following,
//!   all-or-nothing.
//!
//! [`controller::Controller`] ties both to a [`state::ViewStateHolder`] that
//! renderers observe.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod profile;
pub mod state;
pub mod suggest;
pub mod theme;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use client::{DirectoryClient, Endpoints, HttpDirectory};
pub use config::Config;
pub use controller::Controller;
pub use error::{AggregationError, HttpError};
pub use models::{Candidate, Person, Profile, Repository};
pub use profile::ProfileAggregator;
pub use state::{ViewState, ViewStateHolder};
pub use suggest::{SuggestSettings, SuggestionResolver};
pub use theme::{Theme, ThemeSignal};
