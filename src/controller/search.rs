//! Place search: free text in, candidate list out, selection flies the camera.
//!
//! Each keystroke issues a new request. Requests are numbered and a response
//! is applied only if no newer query was issued in the meantime, so results
//! for an abandoned prefix can never overwrite the list for the current text.

use std::sync::{Arc, Mutex, MutexGuard};

use super::animator::CameraAnimator;
use crate::core::config::SearchConfig;
use crate::engine::{lock_map, SharedMapHandle};
use crate::providers::{GeocodeProvider, SearchResult};
use crate::{MapError, Result};

#[derive(Debug, Default)]
struct SearchState {
    query: String,
    results: Vec<SearchResult>,
    latest: u64,
    not_found: bool,
}

fn lock(state: &Mutex<SearchState>) -> MutexGuard<'_, SearchState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// What happened to a resolved request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The results now on display.
    Applied { count: usize },
    /// A newer query was issued first; the response was dropped.
    Superseded,
    /// The query was empty, nothing was requested.
    Cleared,
}

pub struct SearchCoordinator {
    provider: Arc<dyn GeocodeProvider>,
    state: Arc<Mutex<SearchState>>,
    config: SearchConfig,
}

impl SearchCoordinator {
    pub fn new(provider: Arc<dyn GeocodeProvider>, config: SearchConfig) -> Self {
        Self {
            provider,
            state: Arc::new(Mutex::new(SearchState::default())),
            config,
        }
    }

    /// Text currently in the search box.
    pub fn query(&self) -> String {
        lock(&self.state).query.clone()
    }

    pub fn results(&self) -> Vec<SearchResult> {
        lock(&self.state).results.clone()
    }

    /// True when the last applied response for the current text was empty.
    pub fn is_not_found(&self) -> bool {
        lock(&self.state).not_found
    }

    /// Record new search text. Blank text clears the results synchronously
    /// and returns `None`; otherwise the returned request must be resolved to
    /// fetch candidates.
    pub fn on_query_change(&self, text: &str) -> Option<PendingSearch> {
        let mut state = lock(&self.state);
        state.query = text.to_string();
        state.latest += 1;

        if text.trim().is_empty() {
            state.results.clear();
            state.not_found = false;
            return None;
        }

        Some(PendingSearch {
            seq: state.latest,
            query: text.to_string(),
            provider: Arc::clone(&self.provider),
            state: Arc::clone(&self.state),
        })
    }

    /// `on_query_change` followed by resolving the request.
    pub async fn search(&self, text: &str) -> Result<SearchOutcome> {
        match self.on_query_change(text) {
            Some(pending) => pending.resolve().await,
            None => Ok(SearchOutcome::Cleared),
        }
    }

    /// Fly to `result`, stop the idle rotation and reset the search box.
    ///
    /// Must not be called while the caller holds the map lock.
    pub fn on_result_selected(
        &self,
        result: &SearchResult,
        map: &SharedMapHandle,
        animator: &mut CameraAnimator,
    ) -> Result<()> {
        lock_map(map).fly_to(
            result.center_latitude(),
            result.center_longitude(),
            self.config.select_zoom,
        )?;
        animator.stop();
        self.clear();
        log::info!("flying to {} ({})", result.label, result.center);
        Ok(())
    }

    /// Empty the query and results; responses still in flight become stale.
    pub fn clear(&self) {
        let mut state = lock(&self.state);
        state.query.clear();
        state.results.clear();
        state.not_found = false;
        state.latest += 1;
    }
}

impl std::fmt::Debug for SearchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCoordinator")
            .field("state", &*lock(&self.state))
            .finish()
    }
}

/// A geocode request issued for one version of the search text.
pub struct PendingSearch {
    seq: u64,
    query: String,
    provider: Arc<dyn GeocodeProvider>,
    state: Arc<Mutex<SearchState>>,
}

impl PendingSearch {
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether a newer query has been issued since this one.
    pub fn is_stale(&self) -> bool {
        lock(&self.state).latest != self.seq
    }

    /// Run the request and apply its answer if it is still current.
    ///
    /// Errors are only reported for current requests: an empty answer clears
    /// the list and yields `MapError::NotFound`; a transport or provider error
    /// clears the list and is returned as is. The query text is kept.
    pub async fn resolve(self) -> Result<SearchOutcome> {
        let response = self.provider.search(&self.query).await;

        let mut state = lock(&self.state);
        if state.latest != self.seq {
            log::debug!("dropping stale geocode response for '{}'", self.query);
            return Ok(SearchOutcome::Superseded);
        }

        match response {
            Ok(results) if results.is_empty() => {
                state.results.clear();
                state.not_found = true;
                log::info!("no places found for '{}'", self.query);
                Err(MapError::NotFound(self.query))
            }
            Ok(results) => {
                let count = results.len();
                state.results = results;
                state.not_found = false;
                log::info!("{} places found for '{}'", count, self.query);
                Ok(SearchOutcome::Applied { count })
            }
            Err(e) => {
                state.results.clear();
                state.not_found = false;
                log::warn!("geocoding '{}' failed: {}", self.query, e);
                Err(e)
            }
        }
    }
}
