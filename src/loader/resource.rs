//! Generic named async resource with per-key loading state.
//!
//! Tables, columns, relationships and choice options share the same state
//! machine; only the key type and the flight policy differ.
//!
//! ```text
//!            begin()               succeed()
//!   Idle ───────────► Loading ───────────────► Success
//!                       │  ▲
//!                fail() │  │ begin() (retry)
//!                       ▼  │
//!                      Error
//! ```

use std::fmt;
use std::hash::Hash;

use dashmap::DashMap;
use serde::Serialize;

/// Loading state of one resource key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    /// Never requested.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// Data is available.
    Success,
    /// The last attempt failed; see the error message.
    Error,
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Whether concurrent loads of the same key are collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlightPolicy {
    /// Every call issues its own request; terminal writes race and the last
    /// one wins.
    Unguarded,
    /// A call made while a request for the same key is in flight returns
    /// without issuing another.
    #[default]
    SingleFlight,
}

/// Loading state for a family of keys.
pub struct Resource<K>
where
    K: Eq + Hash + Clone,
{
    name: &'static str,
    policy: FlightPolicy,
    status: DashMap<K, LoadStatus>,
    errors: DashMap<K, String>,
    /// Number of attempts currently in flight per key.
    in_flight: DashMap<K, usize>,
}

impl<K> Resource<K>
where
    K: Eq + Hash + Clone,
{
    /// Create a resource with the given flight policy.
    pub fn new(name: &'static str, policy: FlightPolicy) -> Self {
        Self {
            name,
            policy,
            status: DashMap::new(),
            errors: DashMap::new(),
            in_flight: DashMap::new(),
        }
    }

    /// Resource name, for logging.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current state of `key`; `Idle` if never requested.
    pub fn status(&self, key: &K) -> LoadStatus {
        self.status.get(key).map(|s| *s).unwrap_or_default()
    }

    /// Error message of the last failed attempt for `key`.
    pub fn error(&self, key: &K) -> Option<String> {
        self.errors.get(key).map(|e| e.value().clone())
    }

    /// Check if a request for `key` is in flight.
    pub fn is_in_flight(&self, key: &K) -> bool {
        self.in_flight.get(key).is_some_and(|n| *n > 0)
    }

    /// Start an attempt: clears the previous error and moves to `Loading`.
    ///
    /// Returns `None` when the policy is single-flight and another attempt
    /// for the same key is still running.
    pub fn begin(&self, key: &K) -> Option<Attempt<'_, K>> {
        {
            let mut count = self.in_flight.entry(key.clone()).or_insert(0);
            if self.policy == FlightPolicy::SingleFlight && *count > 0 {
                return None;
            }
            *count += 1;
        }

        self.errors.remove(key);
        self.status.insert(key.clone(), LoadStatus::Loading);

        Some(Attempt {
            resource: self,
            key: key.clone(),
            finished: false,
        })
    }

    /// Mark `key` as loaded without a request (served from cache).
    pub fn mark_cached(&self, key: &K) {
        self.errors.remove(key);
        self.status.insert(key.clone(), LoadStatus::Success);
    }

    fn finish(&self, key: &K, outcome: Option<String>) {
        match outcome {
            None => {
                self.errors.remove(key);
                self.status.insert(key.clone(), LoadStatus::Success);
            }
            Some(message) => {
                self.errors.insert(key.clone(), message);
                self.status.insert(key.clone(), LoadStatus::Error);
            }
        }
    }

    fn release(&self, key: &K) {
        let remaining = {
            let Some(mut count) = self.in_flight.get_mut(key) else {
                return;
            };
            *count = count.saturating_sub(1);
            *count
        };
        if remaining == 0 {
            self.in_flight.remove_if(key, |_, n| *n == 0);
        }
    }
}

impl<K> fmt::Debug for Resource<K>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field("keys", &self.status.len())
            .finish()
    }
}

/// One in-flight attempt for a key.
///
/// Dropping an unfinished attempt (the owning future was cancelled) puts the
/// key back to `Idle` if nothing else wrote a terminal state meanwhile.
pub struct Attempt<'a, K>
where
    K: Eq + Hash + Clone,
{
    resource: &'a Resource<K>,
    key: K,
    finished: bool,
}

impl<K> Attempt<'_, K>
where
    K: Eq + Hash + Clone,
{
    /// Record success.
    pub fn succeed(mut self) {
        self.resource.finish(&self.key, None);
        self.finished = true;
    }

    /// Record failure with a human-readable message.
    pub fn fail(mut self, message: impl Into<String>) {
        self.resource.finish(&self.key, Some(message.into()));
        self.finished = true;
    }
}

impl<K> Drop for Attempt<'_, K>
where
    K: Eq + Hash + Clone,
{
    fn drop(&mut self) {
        if !self.finished {
            if let Some(mut status) = self.resource.status.get_mut(&self.key) {
                if *status == LoadStatus::Loading {
                    *status = LoadStatus::Idle;
                }
            }
        }
        self.resource.release(&self.key);
    }
}
