use crate::aggregator::ProfileReport;
use serde::Serialize;
use std::collections::BTreeSet;

/// One axis of the comparison radar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarMetric {
    pub subject: &'static str,
    pub raw_a: u64,
    pub raw_b: u64,
    /// `raw_a` as a percentage of the larger of the two values.
    pub scaled_a: f64,
    pub scaled_b: f64,
}

impl RadarMetric {
    fn new(subject: &'static str, raw_a: u64, raw_b: u64) -> Self {
        let max = raw_a.max(raw_b).max(1) as f64;
        Self {
            subject,
            raw_a,
            raw_b,
            scaled_a: raw_a as f64 / max * 100.0,
            scaled_b: raw_b as f64 / max * 100.0,
        }
    }
}

/// Side-by-side metrics for two profiles, each axis scaled to 0..=100.
pub fn radar_metrics(a: &ProfileReport, b: &ProfileReport) -> Vec<RadarMetric> {
    vec![
        RadarMetric::new(
            "Repositories",
            a.stats.total_repos as u64,
            b.stats.total_repos as u64,
        ),
        RadarMetric::new("Stars", a.stats.total_stars, b.stats.total_stars),
        RadarMetric::new("Forks", a.stats.total_forks, b.stats.total_forks),
        RadarMetric::new("Followers", a.profile.followers, b.profile.followers),
        RadarMetric::new("Following", a.profile.following, b.profile.following),
    ]
}

/// Repositories created per year for both users, oldest year first.
///
/// Covers every year either user has; a year missing for one side counts 0.
pub fn merged_activity(a: &ProfileReport, b: &ProfileReport) -> Vec<(String, u32, u32)> {
    let (pa, pb) = (&a.stats.activity_pattern, &b.stats.activity_pattern);
    let years: BTreeSet<&String> = pa.keys().chain(pb.keys()).collect();

    years
        .into_iter()
        .map(|year| {
            (
                year.clone(),
                pa.get(year).copied().unwrap_or(0),
                pb.get(year).copied().unwrap_or(0),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{Repository, UserProfile};
    use crate::stats::summarize;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn report_with_years(login: &str, years: &[i32]) -> ProfileReport {
        let repos: Vec<Repository> = years
            .iter()
            .enumerate()
            .map(|(i, year)| Repository {
                name: format!("{login}-{i}"),
                html_url: String::new(),
                description: None,
                language: None,
                stargazers_count: 0,
                forks_count: 0,
                watchers_count: 0,
                created_at: Utc.with_ymd_and_hms(*year, 2, 1, 0, 0, 0).unwrap(),
                fork: false,
            })
            .collect();

        ProfileReport {
            profile: UserProfile {
                login: login.to_string(),
                name: None,
                bio: None,
                avatar_url: String::new(),
                followers: 0,
                following: 0,
                public_repos: repos.len() as u64,
                created_at: Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap(),
            },
            stats: summarize(&repos),
        }
    }

    #[test]
    fn merged_activity_unions_years_and_fills_gaps() {
        let a = report_with_years("alice", &[2021, 2019, 2019]);
        let b = report_with_years("bob", &[2020, 2021, 2023]);

        assert_eq!(
            merged_activity(&a, &b),
            vec![
                ("2019".to_string(), 2, 0),
                ("2020".to_string(), 0, 1),
                ("2021".to_string(), 1, 1),
                ("2023".to_string(), 0, 1),
            ]
        );
    }

    #[test]
    fn merged_activity_of_empty_users_is_empty() {
        let a = report_with_years("alice", &[]);
        let b = report_with_years("bob", &[]);
        assert!(merged_activity(&a, &b).is_empty());
    }

    #[test]
    fn larger_value_scales_to_hundred() {
        let m = RadarMetric::new("Stars", 50, 200);
        assert_eq!(m.scaled_a, 25.0);
        assert_eq!(m.scaled_b, 100.0);
        assert_eq!((m.raw_a, m.raw_b), (50, 200));
    }

    #[test]
    fn both_zero_stays_zero() {
        let m = RadarMetric::new("Forks", 0, 0);
        assert_eq!(m.scaled_a, 0.0);
        assert_eq!(m.scaled_b, 0.0);
    }

    #[test]
    fn equal_values_are_both_full() {
        let m = RadarMetric::new("Followers", 7, 7);
        assert_eq!(m.scaled_a, 100.0);
        assert_eq!(m.scaled_b, 100.0);
    }
}
