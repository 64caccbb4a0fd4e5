//! Cross-scenario progress: which scenarios have been completed at least once.

use super::{KvStore, StoreError};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Store key for the tracker state.
pub const PROGRESS_KEY: &str = "iot-platform-progress";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressTracker {
    /// slug -> completed
    completed_systems: BTreeMap<String, bool>,
}

impl ProgressTracker {
    /// Fresh tracker for the given scenario slugs, nothing completed.
    pub fn new<I, S>(slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            completed_systems: slugs.into_iter().map(|s| (s.into(), false)).collect(),
        }
    }

    /// Load saved state, keeping only the known slugs.
    pub fn load<I, S>(store: &impl KvStore, slugs: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tracker = Self::new(slugs);
        if let Some(saved) = store.get::<ProgressTracker>(PROGRESS_KEY)? {
            for (slug, done) in saved.completed_systems {
                match tracker.completed_systems.get_mut(&slug) {
                    Some(entry) => *entry = done,
                    None => warn!("ignoring progress for unknown scenario {}", slug),
                }
            }
        }
        Ok(tracker)
    }

    pub fn save(&self, store: &mut impl KvStore) -> Result<(), StoreError> {
        store.set(PROGRESS_KEY, self)
    }

    /// Returns true when the scenario was not completed before.
    pub fn mark_complete(&mut self, slug: &str) -> bool {
        match self.completed_systems.get_mut(slug) {
            Some(done) => !std::mem::replace(done, true),
            None => {
                warn!("cannot mark unknown scenario {} complete", slug);
                false
            }
        }
    }

    pub fn is_complete(&self, slug: &str) -> bool {
        self.completed_systems.get(slug).copied().unwrap_or(false)
    }

    /// Completed share of all scenarios, as a rounded percentage.
    pub fn score(&self) -> u8 {
        let total = self.completed_systems.len();
        if total == 0 {
            return 0;
        }
        let done = self.completed_systems.values().filter(|d| **d).count();
        (done as f64 / total as f64 * 100.0).round() as u8
    }

    pub fn all_completed(&self) -> bool {
        self.completed_systems.values().all(|d| *d)
    }

    pub fn reset(&mut self) {
        for done in self.completed_systems.values_mut() {
            *done = false;
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, bool)> {
        self.completed_systems.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
