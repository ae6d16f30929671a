use crate::github::{GithubApi, GithubError, UserProfile};
use crate::stats::{StatsSummary, summarize};
use serde::Serialize;
use tracing::{info, warn};

/// Everything shown for one username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileReport {
    pub profile: UserProfile,
    pub stats: StatsSummary,
}

/// Fetches a user's profile and repositories and reduces them to a [`ProfileReport`].
///
/// Holds no state between calls: every `aggregate` goes back to the API.
pub struct ProfileAggregator<A> {
    api: A,
}

impl<A: GithubApi> ProfileAggregator<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// `username` must already be trimmed and non-empty.
    pub async fn aggregate(&self, username: &str) -> Result<ProfileReport, GithubError> {
        let result = self.fetch_and_summarize(username).await;

        match &result {
            Ok(report) => info!(
                user = %report.profile.login,
                repos = report.stats.total_repos,
                stars = report.stats.total_stars,
                "aggregated profile"
            ),
            Err(e) => warn!(user = %username, error = %e, "aggregation failed"),
        }

        result
    }

    async fn fetch_and_summarize(&self, username: &str) -> Result<ProfileReport, GithubError> {
        let profile = self.api.fetch_user(username).await?;
        let repos = self.api.fetch_repos(username).await?;

        Ok(ProfileReport {
            profile,
            stats: summarize(&repos),
        })
    }
}
