use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use urlencoding::encode;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Upper bound on repositories per user; only the first page is read.
pub const REPOS_PER_PAGE: u32 = 100;

/// The two ways an aggregation can fail. Both are terminal for the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GithubError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("GitHub API error: {0}")]
    Upstream(String),
}

impl GithubError {
    /// Short message suitable for showing to the person who typed the username.
    pub fn user_message(&self) -> &'static str {
        match self {
            GithubError::UserNotFound(_) => "User not found",
            GithubError::Upstream(_) => "GitHub API Error",
        }
    }
}

impl From<reqwest::Error> for GithubError {
    fn from(e: reqwest::Error) -> Self {
        GithubError::Upstream(format!("request failed: {e}"))
    }
}

impl From<serde_json::Error> for GithubError {
    fn from(e: serde_json::Error) -> Self {
        GithubError::Upstream(format!("malformed response: {e}"))
    }
}

/// `null` and missing both mean "use the default".
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// Profile as returned by `GET /users/{username}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub login: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub followers: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub following: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub public_repos: u64,
    pub created_at: DateTime<Utc>,
}

/// One element of `GET /users/{username}/repos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stargazers_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub forks_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub watchers_count: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fork: bool,
}

/// Read-only view of the upstream API used by the aggregator.
#[async_trait]
pub trait GithubApi: Send + Sync {
    async fn fetch_user(&self, username: &str) -> Result<UserProfile, GithubError>;

    /// Up to [`REPOS_PER_PAGE`] repositories, most recently updated first.
    async fn fetch_repos(&self, username: &str) -> Result<Vec<Repository>, GithubError>;
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct GithubClient {
    api_base: Arc<String>,
    http: Arc<Client>,
}

impl GithubClient {
    /// Build an unauthenticated REST client against `config.api_base`.
    pub fn new(config: &ClientConfig) -> Result<Self, GithubError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("gitanalyzer"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        let http = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            api_base: Arc::new(config.api_base.trim_end_matches('/').to_string()),
            http: Arc::new(http),
        })
    }

    fn user_url(&self, username: &str) -> String {
        format!("{}/users/{}", self.api_base, encode(username))
    }

    fn repos_url(&self, username: &str) -> String {
        format!(
            "{}/users/{}/repos?per_page={REPOS_PER_PAGE}&sort=updated",
            self.api_base,
            encode(username)
        )
    }

    /// Single GET; the body is read as text so status handling stays in one place.
    async fn get(&self, url: &str) -> Result<(StatusCode, String), GithubError> {
        debug!(%url, "GET");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| GithubError::Upstream(format!("network error: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| GithubError::Upstream(format!("failed to read response body: {e}")))?;

        debug!(%url, status = status.as_u16(), bytes = body.len(), "response");
        Ok((status, body))
    }
}

#[async_trait]
impl GithubApi for GithubClient {
    async fn fetch_user(&self, username: &str) -> Result<UserProfile, GithubError> {
        let (status, body) = self.get(&self.user_url(username)).await?;
        parse_user(username, status, &body)
    }

    async fn fetch_repos(&self, username: &str) -> Result<Vec<Repository>, GithubError> {
        let (status, body) = self.get(&self.repos_url(username)).await?;
        parse_repos(username, status, &body)
    }
}

/// Interpret a `/users/{username}` response.
///
/// 404 and a decoded body without a string `login` both mean the account
/// does not exist; every other failure is an upstream error.
pub(crate) fn parse_user(
    username: &str,
    status: StatusCode,
    body: &str,
) -> Result<UserProfile, GithubError> {
    if status == StatusCode::NOT_FOUND {
        return Err(GithubError::UserNotFound(username.to_string()));
    }
    if !status.is_success() {
        return Err(GithubError::Upstream(format!(
            "HTTP {} fetching user {username}",
            status.as_u16()
        )));
    }

    let json: Value = serde_json::from_str(body)?;
    if !json.get("login").is_some_and(Value::is_string) {
        return Err(GithubError::UserNotFound(username.to_string()));
    }

    Ok(serde_json::from_value(json)?)
}

pub(crate) fn parse_repos(
    username: &str,
    status: StatusCode,
    body: &str,
) -> Result<Vec<Repository>, GithubError> {
    if !status.is_success() {
        return Err(GithubError::Upstream(format!(
            "HTTP {} listing repositories of {username}",
            status.as_u16()
        )));
    }

    Ok(serde_json::from_str(body)?)
}
