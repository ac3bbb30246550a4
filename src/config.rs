//! Configuration Module
//!
//! Handles loading and managing storage configuration from environment variables.

use std::env;

use crate::cache::{PolicyKind, DEFAULT_EVICTION_THREADS, DEFAULT_MAX_ENTRIES};

/// Storage configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of URI entries the table can hold
    pub max_entries: usize,
    /// Worker threads for the maintenance pool
    pub eviction_threads: usize,
    /// Eviction policy used when the table is full
    pub policy: PolicyKind,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum URI entries (default: 1000)
    /// - `EVICTION_THREADS` - Maintenance worker threads (default: 1, minimum: 1)
    /// - `EVICTION_POLICY` - `lru` or `clock` (default: lru)
    pub fn from_env() -> Self {
        Self {
            max_entries: env::var("MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_ENTRIES),
            eviction_threads: env::var("EVICTION_THREADS")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(DEFAULT_EVICTION_THREADS)
                .max(1),
            policy: env::var("EVICTION_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
        }
    }

    /// Returns a copy with a different capacity.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Returns a copy with a different eviction policy.
    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            eviction_threads: DEFAULT_EVICTION_THREADS,
            policy: PolicyKind::Lru,
        }
    }
}
