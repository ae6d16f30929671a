//! Result slots for the primary and comparison usernames.
//!
//! Each slot hands out a fresh [`RequestToken`] whenever a fetch starts and
//! only accepts the completion carrying the newest token. A slow response
//! for an old username therefore cannot overwrite a newer one.

use crate::aggregator::{ProfileAggregator, ProfileReport};
use crate::github::{GithubApi, GithubError};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Primary,
    Comparison,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Primary => f.write_str("primary"),
            Slot::Comparison => f.write_str("comparison"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SlotState {
    #[default]
    NotRequested,
    Loading,
    Ready(Arc<ProfileReport>),
    Failed(GithubError),
}

/// Identifies one fetch for one slot. Later tokens supersede earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    slot: Slot,
    seq: u64,
}

impl RequestToken {
    pub fn slot(&self) -> Slot {
        self.slot
    }
}

#[derive(Default)]
struct SlotEntry {
    latest: u64,
    state: SlotState,
}

#[derive(Default)]
pub struct ResultSlots {
    primary: Mutex<SlotEntry>,
    comparison: Mutex<SlotEntry>,
}

impl ResultSlots {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, slot: Slot) -> &Mutex<SlotEntry> {
        match slot {
            Slot::Primary => &self.primary,
            Slot::Comparison => &self.comparison,
        }
    }

    /// Start a fetch for `slot`; the slot shows `Loading` until it completes.
    pub fn begin(&self, slot: Slot) -> RequestToken {
        let mut entry = self.entry(slot).lock();
        entry.latest += 1;
        entry.state = SlotState::Loading;
        debug!(%slot, seq = entry.latest, "request started");

        RequestToken {
            slot,
            seq: entry.latest,
        }
    }

    /// Store a finished fetch. Returns `false` (and drops the result) when a
    /// newer request has been started for the same slot.
    pub fn complete(&self, token: RequestToken, result: Result<ProfileReport, GithubError>) -> bool {
        self.apply(token, state_for(result))
    }

    fn apply(&self, token: RequestToken, state: SlotState) -> bool {
        let mut entry = self.entry(token.slot).lock();
        if token.seq != entry.latest {
            warn!(
                slot = %token.slot,
                seq = token.seq,
                latest = entry.latest,
                "discarding stale response"
            );
            return false;
        }

        // A failure replaces any earlier result for the slot.
        entry.state = state;
        true
    }

    pub fn state(&self, slot: Slot) -> SlotState {
        self.entry(slot).lock().state.clone()
    }

    pub fn ready(&self, slot: Slot) -> Option<Arc<ProfileReport>> {
        match &self.entry(slot).lock().state {
            SlotState::Ready(report) => Some(Arc::clone(report)),
            _ => None,
        }
    }
}

fn state_for(result: Result<ProfileReport, GithubError>) -> SlotState {
    match result {
        Ok(report) => SlotState::Ready(Arc::new(report)),
        Err(e) => SlotState::Failed(e),
    }
}

/// What became of one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The slot now holds this search's own result.
    Applied(SlotState),
    /// A newer search for the same slot started meanwhile; this result was dropped.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please enter a username!")]
    EmptyUsername,
}

/// Drives the aggregator for the two slots.
pub struct Session<A> {
    aggregator: ProfileAggregator<A>,
    slots: ResultSlots,
}

impl<A: GithubApi> Session<A> {
    pub fn new(api: A) -> Self {
        Self {
            aggregator: ProfileAggregator::new(api),
            slots: ResultSlots::new(),
        }
    }

    pub fn slots(&self) -> &ResultSlots {
        &self.slots
    }

    /// Fetch `raw_username` into `slot`. Surrounding whitespace is ignored;
    /// blank input is rejected before anything is requested.
    pub async fn search(
        &self,
        slot: Slot,
        raw_username: &str,
    ) -> Result<SearchOutcome, InputError> {
        let username = raw_username.trim();
        if username.is_empty() {
            return Err(InputError::EmptyUsername);
        }

        let token = self.slots.begin(slot);
        let state = state_for(self.aggregator.aggregate(username).await);
        if self.slots.apply(token, state.clone()) {
            Ok(SearchOutcome::Applied(state))
        } else {
            Ok(SearchOutcome::Superseded)
        }
    }

    /// Fill both slots at once. Neither waits on nor fails because of the other.
    pub async fn search_both(
        &self,
        primary: &str,
        comparison: &str,
    ) -> (
        Result<SearchOutcome, InputError>,
        Result<SearchOutcome, InputError>,
    ) {
        tokio::join!(
            self.search(Slot::Primary, primary),
            self.search(Slot::Comparison, comparison)
        )
    }

    /// True once both slots hold a result.
    pub fn compare_mode(&self) -> bool {
        self.slots.ready(Slot::Primary).is_some() && self.slots.ready(Slot::Comparison).is_some()
    }
}
