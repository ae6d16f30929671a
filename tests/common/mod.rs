//! In-memory stand-in for the GitHub API.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use gitanalyzer::{GithubApi, GithubError, Repository, UserProfile};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

#[derive(Clone, Default)]
pub struct FakeGithub {
    users: HashMap<String, UserProfile>,
    repos: HashMap<String, Vec<Repository>>,
    broken_repos: HashSet<String>,
    /// `fetch_user` for these logins waits until notified.
    gates: HashMap<String, Arc<Notify>>,
    /// `fetch_repos` for these logins notifies once done.
    releases: HashMap<String, Arc<Notify>>,
    user_calls: Arc<AtomicUsize>,
    repo_calls: Arc<AtomicUsize>,
}

impl FakeGithub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, profile: UserProfile, repos: Vec<Repository>) -> Self {
        self.repos.insert(profile.login.clone(), repos);
        self.users.insert(profile.login.clone(), profile);
        self
    }

    pub fn with_broken_repos(mut self, login: &str) -> Self {
        self.broken_repos.insert(login.to_string());
        self
    }

    pub fn gate_user(mut self, login: &str, gate: Arc<Notify>) -> Self {
        self.gates.insert(login.to_string(), gate);
        self
    }

    pub fn release_after(mut self, login: &str, gate: Arc<Notify>) -> Self {
        self.releases.insert(login.to_string(), gate);
        self
    }

    pub fn user_calls(&self) -> usize {
        self.user_calls.load(Ordering::SeqCst)
    }

    pub fn repo_calls(&self) -> usize {
        self.repo_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GithubApi for FakeGithub {
    async fn fetch_user(&self, username: &str) -> Result<UserProfile, GithubError> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = self.gates.get(username) {
            gate.notified().await;
        }
        self.users
            .get(username)
            .cloned()
            .ok_or_else(|| GithubError::UserNotFound(username.to_string()))
    }

    async fn fetch_repos(&self, username: &str) -> Result<Vec<Repository>, GithubError> {
        self.repo_calls.fetch_add(1, Ordering::SeqCst);
        if self.broken_repos.contains(username) {
            return Err(GithubError::Upstream("HTTP 500".to_string()));
        }
        let repos = self.repos.get(username).cloned().unwrap_or_default();
        if let Some(gate) = self.releases.get(username) {
            gate.notify_one();
        }
        Ok(repos)
    }
}

pub fn profile(login: &str) -> UserProfile {
    UserProfile {
        login: login.to_string(),
        name: None,
        bio: None,
        avatar_url: format!("https://avatars.githubusercontent.com/{login}"),
        followers: 12,
        following: 4,
        public_repos: 0,
        created_at: Utc.with_ymd_and_hms(2014, 7, 1, 9, 30, 0).unwrap(),
    }
}

pub fn repo(name: &str, language: Option<&str>, stars: u64, year: i32, fork: bool) -> Repository {
    Repository {
        name: name.to_string(),
        html_url: format!("https://github.com/someone/{name}"),
        description: None,
        language: language.map(str::to_string),
        stargazers_count: stars,
        forks_count: stars % 7,
        watchers_count: stars + 1,
        created_at: Utc.with_ymd_and_hms(year, 11, 2, 8, 0, 0).unwrap(),
        fork,
    }
}
