use crate::github::Repository;
use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;

/// How many repositories make the "top" list.
pub const TOP_REPO_LIMIT: usize = 5;

/// Aggregate figures for one user's repository list.
///
/// Always built in one go by [`summarize`]; the totals are never updated
/// piecemeal, so they stay consistent with the list they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub total_stars: u64,
    pub total_forks: u64,
    pub total_watchers: u64,
    pub total_repos: usize,
    /// Repositories per detected language. Repositories without one are left out.
    pub language_stats: BTreeMap<String, u32>,
    /// Repositories per creation year (`"2019"`, `"2020"`, ...).
    pub activity_pattern: BTreeMap<String, u32>,
    /// Non-fork repositories, most starred first.
    pub top_repos: Vec<Repository>,
}

pub fn summarize(repos: &[Repository]) -> StatsSummary {
    let mut total_stars = 0u64;
    let mut total_forks = 0u64;
    let mut total_watchers = 0u64;
    let mut language_stats: BTreeMap<String, u32> = BTreeMap::new();
    let mut activity_pattern: BTreeMap<String, u32> = BTreeMap::new();

    for repo in repos {
        total_stars = total_stars.saturating_add(repo.stargazers_count);
        total_forks = total_forks.saturating_add(repo.forks_count);
        total_watchers = total_watchers.saturating_add(repo.watchers_count);

        if let Some(lang) = &repo.language {
            *language_stats.entry(lang.clone()).or_default() += 1;
        }

        let year = format!("{:04}", repo.created_at.year());
        *activity_pattern.entry(year).or_default() += 1;
    }

    StatsSummary {
        total_stars,
        total_forks,
        total_watchers,
        total_repos: repos.len(),
        language_stats,
        activity_pattern,
        top_repos: top_repos(repos),
    }
}

/// `sort_by` is stable, so equal star counts keep the upstream order.
fn top_repos(repos: &[Repository]) -> Vec<Repository> {
    let mut own: Vec<&Repository> = repos.iter().filter(|r| !r.fork).collect();
    own.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));
    own.into_iter().take(TOP_REPO_LIMIT).cloned().collect()
}

impl StatsSummary {
    /// Languages for display: most used first, ties by name.
    pub fn languages_by_count(&self, limit: usize) -> Vec<(&str, u32)> {
        let mut langs: Vec<(&str, u32)> = self
            .language_stats
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        langs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        langs.truncate(limit);
        langs
    }

    /// Years for display, oldest first.
    pub fn activity_by_year(&self) -> Vec<(&str, u32)> {
        // Keys are four-digit years, so map order is already chronological.
        self.activity_pattern
            .iter()
            .map(|(year, count)| (year.as_str(), *count))
            .collect()
    }

    /// Percentage of language-tagged repositories using `language`.
    pub fn language_share(&self, language: &str) -> f64 {
        let tagged: u32 = self.language_stats.values().sum();
        if tagged == 0 {
            return 0.0;
        }
        let count = self.language_stats.get(language).copied().unwrap_or(0);
        f64::from(count) * 100.0 / f64::from(tagged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn repo(name: &str, lang: Option<&str>, stars: u64, year: i32, fork: bool) -> Repository {
        Repository {
            name: name.to_string(),
            html_url: format!("https://github.com/octocat/{name}"),
            description: None,
            language: lang.map(str::to_string),
            stargazers_count: stars,
            forks_count: stars / 2,
            watchers_count: stars,
            created_at: Utc.with_ymd_and_hms(year, 3, 14, 12, 0, 0).unwrap(),
            fork,
        }
    }

    #[test]
    fn empty_list_gives_zeroed_summary() {
        let s = summarize(&[]);
        assert_eq!(s.total_repos, 0);
        assert_eq!(s.total_stars, 0);
        assert!(s.language_stats.is_empty());
        assert!(s.activity_pattern.is_empty());
        assert!(s.top_repos.is_empty());
    }

    #[test]
    fn totals_match_repository_list() {
        let repos = vec![
            repo("a", Some("Rust"), 10, 2020, false),
            repo("b", Some("Go"), 4, 2021, true),
            repo("c", None, 0, 2021, false),
        ];
        let s = summarize(&repos);

        assert_eq!(s.total_repos, 3);
        assert_eq!(s.total_stars, 14);
        assert_eq!(s.total_forks, 5 + 2);
        assert_eq!(s.total_watchers, 14);
    }

    #[test]
    fn null_language_is_excluded() {
        let mut repos = vec![repo("none", None, 1, 2020, false)];
        for i in 0..9 {
            repos.push(repo(&format!("x{i}"), Some("X"), 1, 2020, false));
        }
        let s = summarize(&repos);

        assert_eq!(s.language_stats.len(), 1);
        assert_eq!(s.language_stats.get("X"), Some(&9));
        assert!(s.language_stats.values().sum::<u32>() as usize <= s.total_repos);
    }

    #[test]
    fn activity_groups_by_creation_year() {
        let repos = vec![
            repo("a", None, 0, 2019, false),
            repo("b", None, 0, 2021, false),
            repo("c", None, 0, 2019, true),
        ];
        let s = summarize(&repos);

        let expected: BTreeMap<String, u32> =
            [("2019".to_string(), 2), ("2021".to_string(), 1)].into();
        assert_eq!(s.activity_pattern, expected);
        assert_eq!(s.activity_pattern.values().sum::<u32>(), 3);
        assert_eq!(s.activity_by_year(), vec![("2019", 2), ("2021", 1)]);
    }

    #[test]
    fn top_repos_skip_forks_and_cap_at_five() {
        let repos = vec![
            repo("fork-big", Some("C"), 500, 2018, true),
            repo("r1", Some("Rust"), 1, 2020, false),
            repo("r2", Some("Rust"), 50, 2020, false),
            repo("r3", Some("Rust"), 7, 2020, false),
            repo("r4", Some("Rust"), 30, 2020, false),
            repo("r5", Some("Rust"), 2, 2020, false),
            repo("r6", Some("Rust"), 9, 2020, false),
        ];
        let s = summarize(&repos);

        let names: Vec<&str> = s.top_repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["r2", "r4", "r6", "r3", "r5"]);
        assert!(s.top_repos.iter().all(|r| !r.fork));
        assert!(
            s.top_repos
                .windows(2)
                .all(|w| w[0].stargazers_count >= w[1].stargazers_count)
        );
    }

    #[test]
    fn star_ties_keep_upstream_order() {
        let repos = vec![
            repo("newest", None, 3, 2022, false),
            repo("older", None, 3, 2020, false),
            repo("oldest", None, 3, 2018, false),
        ];
        let s = summarize(&repos);

        let names: Vec<&str> = s.top_repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["newest", "older", "oldest"]);
    }

    #[test]
    fn only_forks_means_no_top_repos() {
        let repos = vec![repo("f", Some("C"), 10, 2020, true)];
        assert!(summarize(&repos).top_repos.is_empty());
    }

    #[test]
    fn summarizing_twice_is_identical() {
        let repos = vec![
            repo("a", Some("Rust"), 10, 2020, false),
            repo("b", Some("Go"), 10, 2021, false),
            repo("c", Some("Rust"), 3, 2021, true),
        ];
        assert_eq!(summarize(&repos), summarize(&repos));
    }

    #[test]
    fn languages_sorted_by_count_then_name() {
        let repos = vec![
            repo("a", Some("Go"), 0, 2020, false),
            repo("b", Some("Rust"), 0, 2020, false),
            repo("c", Some("Rust"), 0, 2020, false),
            repo("d", Some("C"), 0, 2020, false),
        ];
        let s = summarize(&repos);

        assert_eq!(
            s.languages_by_count(8),
            vec![("Rust", 2), ("C", 1), ("Go", 1)]
        );
        assert_eq!(s.languages_by_count(1), vec![("Rust", 2)]);
    }

    #[test]
    fn language_share_is_a_percentage_of_tagged_repos() {
        let repos = vec![
            repo("a", Some("Rust"), 0, 2020, false),
            repo("b", Some("Rust"), 0, 2020, false),
            repo("c", Some("Go"), 0, 2020, false),
            repo("d", Some("Go"), 0, 2020, false),
            repo("e", None, 0, 2020, false),
        ];
        let s = summarize(&repos);

        assert_eq!(s.language_share("Rust"), 50.0);
        assert_eq!(s.language_share("Haskell"), 0.0);
        assert_eq!(summarize(&[]).language_share("Rust"), 0.0);
    }
}
