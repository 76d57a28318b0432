//! In-memory listing backend
//!
//! Holds canned listings keyed by directory path. Besides serving hosts that
//! already have the whole hierarchy at hand, it lets tests inject failures,
//! hold a directory's response until released (to control completion order),
//! and count calls per directory.

use super::{DirectoryFetcher, Listing, ListingEntry, ListingError, ListingParams};
use crate::primitives::path_utils::dir_key;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Semaphore;

#[derive(Debug, Default)]
struct MemoryState {
    listings: HashMap<String, Listing>,
    failures: HashSet<String>,
    gates: HashMap<String, Arc<Semaphore>>,
    calls: HashMap<String, usize>,
    last_params: Option<ListingParams>,
}

/// Handle to a held directory; each `release` lets one pending call finish
#[derive(Debug, Clone)]
pub struct Gate {
    semaphore: Arc<Semaphore>,
}

impl Gate {
    pub fn release(&self) {
        self.semaphore.add_permits(1);
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Builder form of [`MemoryFetcher::set_listing`]
    pub fn with_dir(self, dir: &str, entries: Vec<ListingEntry>) -> Self {
        self.set_listing(dir, entries);
        self
    }

    /// Replace the children reported for `dir`
    pub fn set_listing(&self, dir: &str, entries: Vec<ListingEntry>) {
        self.state().listings.insert(dir_key(dir), entries);
    }

    /// Make every call for `dir` fail until [`MemoryFetcher::recover`]
    pub fn fail(&self, dir: &str) {
        self.state().failures.insert(dir_key(dir));
    }

    pub fn recover(&self, dir: &str) {
        self.state().failures.remove(&dir_key(dir));
    }

    /// Hold responses for `dir` until the returned gate is released
    pub fn hold(&self, dir: &str) -> Gate {
        let semaphore = Arc::new(Semaphore::new(0));
        self.state()
            .gates
            .insert(dir_key(dir), Arc::clone(&semaphore));
        Gate { semaphore }
    }

    /// Stop holding `dir`; calls already waiting still need a release
    pub fn open(&self, dir: &str) {
        self.state().gates.remove(&dir_key(dir));
    }

    /// Number of calls made for `dir` so far
    pub fn calls(&self, dir: &str) -> usize {
        self.state().calls.get(&dir_key(dir)).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.state().calls.values().sum()
    }

    /// Parameters of the most recent call
    pub fn last_params(&self) -> Option<ListingParams> {
        self.state().last_params.clone()
    }
}

#[async_trait]
impl DirectoryFetcher for MemoryFetcher {
    async fn list_children(
        &self,
        path: &str,
        params: &ListingParams,
    ) -> Result<Listing, ListingError> {
        let key = dir_key(path);
        let gate = {
            let mut state = self.state();
            *state.calls.entry(key.clone()).or_insert(0) += 1;
            state.last_params = Some(params.clone());
            state.gates.get(&key).cloned()
        };

        if let Some(gate) = gate {
            gate.acquire()
                .await
                .map_err(|_| ListingError::Cancelled)?
                .forget();
        }

        let state = self.state();
        if state.failures.contains(&key) {
            return Err(ListingError::Io(io::Error::other(format!(
                "simulated failure listing {}",
                key
            ))));
        }
        state.listings.get(&key).cloned().ok_or_else(|| {
            ListingError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no listing for {}", key),
            ))
        })
    }
}
