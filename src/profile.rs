//! Profile aggregation: one primary user lookup, then three dependent
//! listings, all-or-nothing.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::{fetch_as, strip_uri_template, DirectoryClient, Endpoints};
use crate::error::{AggregationError, HttpError};
use crate::models::{PersonRecord, Profile, RepoRecord, UserRecord};

pub struct ProfileAggregator<C: ?Sized> {
    client: Arc<C>,
    endpoints: Endpoints,
}

impl<C: ?Sized> Clone for ProfileAggregator<C> {
    fn clone(&self) -> Self {
        ProfileAggregator {
            client: Arc::clone(&self.client),
            endpoints: self.endpoints.clone(),
        }
    }
}

impl<C> ProfileAggregator<C>
where
    C: DirectoryClient + ?Sized,
{
    pub fn new(client: Arc<C>, endpoints: Endpoints) -> Self {
        ProfileAggregator { client, endpoints }
    }

    /// Resolves `login` into a complete [`Profile`].
    ///
    /// A 404 on the user resource is [`AggregationError::NotFound`]; every other
    /// failure, including any failure of the three dependent listings, is
    /// [`AggregationError::Transient`]. No partial profile is ever returned.
    pub async fn resolve_profile(&self, login: &str) -> Result<Profile, AggregationError> {
        let user_url = self.endpoints.user(login);
        info!(%login, "resolving profile");

        let user: UserRecord = fetch_as(&*self.client, user_url.as_str())
            .await
            .map_err(|err| classify_primary(login, err))?;

        let following_url = strip_uri_template(&user.following_url);
        debug!(
            repos = %user.repos_url,
            followers = %user.followers_url,
            following = %following_url,
            "fetching dependent listings"
        );

        let (repos, followers, following) = tokio::try_join!(
            fetch_as::<Vec<RepoRecord>, C>(&*self.client, &user.repos_url),
            fetch_as::<Vec<PersonRecord>, C>(&*self.client, &user.followers_url),
            fetch_as::<Vec<PersonRecord>, C>(&*self.client, &following_url),
        )
        .map_err(|err| {
            warn!(%login, error = %err, "dependent fetch failed");
            AggregationError::transient(err)
        })?;

        let profile = Profile::assemble(user, repos, followers, following);
        info!(
            login = %profile.identifier,
            repos = profile.repository_count(),
            followers = profile.follower_count(),
            following = profile.following_count(),
            "profile resolved"
        );
        Ok(profile)
    }
}

fn classify_primary(login: &str, err: HttpError) -> AggregationError {
    if err.is_not_found() {
        debug!(%login, "user does not exist");
        AggregationError::NotFound {
            login: login.to_string(),
        }
    } else {
        warn!(%login, error = %err, "user lookup failed");
        AggregationError::transient(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_404_means_not_found() {
        assert!(classify_primary("x", HttpError::Status { status: 404 }).is_not_found());
        assert!(!classify_primary("x", HttpError::Status { status: 403 }).is_not_found());
        assert!(!classify_primary("x", HttpError::Transport("dns".into())).is_not_found());
        assert!(!classify_primary("x", HttpError::Decode("eof".into())).is_not_found());
    }
}
