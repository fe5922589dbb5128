use serde::Deserialize;

/// A GitHub user profile as returned by `/users/{username}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub login: String,
    pub id: u64,
    pub avatar_url: String,
    pub html_url: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub repos_url: String,
    pub followers_url: String,
    /// Carries a `{/other_user}` URI template suffix.
    pub following_url: String,
}

/// Response from the GitHub Search Users API (`/search/users`).
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub items: Vec<SearchUser>,
}

/// A single user item from the search results.
#[derive(Debug, Deserialize)]
pub struct SearchUser {
    pub login: String,
    pub id: u64,
}

/// One entry of a `repos_url` listing.
#[derive(Debug, Deserialize)]
pub struct RepoRecord {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
}

/// One entry of a `followers_url` or `following_url` listing.
#[derive(Debug, Deserialize)]
pub struct PersonRecord {
    pub id: u64,
    pub login: String,
    pub html_url: String,
}

/// A search-as-you-type suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub identifier: String,
    pub display_label: String,
}

impl From<SearchUser> for Candidate {
    fn from(user: SearchUser) -> Self {
        Candidate {
            display_label: user.login.clone(),
            identifier: user.login,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub identifier: u64,
    pub name: String,
    pub description: Option<String>,
    pub external_link: String,
    pub star_count: u64,
    pub fork_count: u64,
}

impl From<RepoRecord> for Repository {
    fn from(repo: RepoRecord) -> Self {
        Repository {
            identifier: repo.id,
            name: repo.name,
            description: repo.description,
            external_link: repo.html_url,
            star_count: repo.stargazers_count,
            fork_count: repo.forks_count,
        }
    }
}

/// A follower or followed account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub identifier: u64,
    pub handle: String,
    pub external_link: String,
}

impl From<PersonRecord> for Person {
    fn from(person: PersonRecord) -> Self {
        Person {
            identifier: person.id,
            handle: person.login,
            external_link: person.html_url,
        }
    }
}

/// A fully assembled profile. Only ever built once all four fetches succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Login handle.
    pub identifier: String,
    pub numeric_id: u64,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_reference: String,
    pub external_link: String,
    pub location: Option<String>,
    pub company: Option<String>,
    pub repository_list: Vec<Repository>,
    pub follower_list: Vec<Person>,
    pub following_list: Vec<Person>,
}

impl Profile {
    pub(crate) fn assemble(
        user: UserRecord,
        repos: Vec<RepoRecord>,
        followers: Vec<PersonRecord>,
        following: Vec<PersonRecord>,
    ) -> Self {
        Profile {
            identifier: user.login,
            numeric_id: user.id,
            display_name: user.name,
            bio: user.bio,
            avatar_reference: user.avatar_url,
            external_link: user.html_url,
            location: user.location,
            company: user.company,
            repository_list: repos.into_iter().map(Repository::from).collect(),
            follower_list: followers.into_iter().map(Person::from).collect(),
            following_list: following.into_iter().map(Person::from).collect(),
        }
    }

    pub fn repository_count(&self) -> usize {
        self.repository_list.len()
    }

    pub fn follower_count(&self) -> usize {
        self.follower_list.len()
    }

    pub fn following_count(&self) -> usize {
        self.following_list.len()
    }
}
