//! Fetch a GitHub user's profile and public repositories and boil them down
//! to totals, language and yearly activity histograms and a top-5 list.

pub mod age;
pub mod aggregator;
pub mod compare;
pub mod github;
pub mod slots;
pub mod stats;
pub mod svg;

pub use aggregator::{ProfileAggregator, ProfileReport};
pub use github::{ClientConfig, GithubApi, GithubClient, GithubError, Repository, UserProfile};
pub use slots::{
    InputError, RequestToken, ResultSlots, SearchOutcome, Session, Slot, SlotState,
};
pub use stats::{StatsSummary, summarize};
