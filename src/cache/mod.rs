//! Cache Module
//!
//! Provides the bounded, concurrent URI -> Vary -> item storage with pluggable
//! eviction.

mod item;
mod key;
mod materialize;
mod policy;
mod stats;
mod store;
mod variants;
mod vary;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use item::CacheItem;
pub use key::Key;
pub use materialize::materialize;
pub use policy::{ClockPolicy, EvictionPolicy, LruPolicy, ParsePolicyKindError, PolicyKind};
pub use stats::{CacheStats, StatsCounter};
pub use store::CacheStore;
pub use variants::VariantMap;
pub use vary::Vary;

// == Public Constants ==
/// Default maximum number of URI families
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Default maintenance worker count
pub const DEFAULT_EVICTION_THREADS: usize = 1;
