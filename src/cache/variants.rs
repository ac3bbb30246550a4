//! Variant Map Module
//!
//! Holds every cached representation of one URI.

use crate::cache::{CacheItem, Vary};
use crate::models::CacheRequest;

// == Variant Map ==
/// Vary selector -> item for a single URI, kept in store order.
///
/// Families are small (one entry per negotiated representation), so a
/// vector keeps lookups cheap and gives request matching a stable order:
/// the most recently stored variant is checked first.
#[derive(Debug, Default)]
pub struct VariantMap {
    /// Oldest first
    entries: Vec<(Vary, CacheItem)>,
}

impl VariantMap {
    pub fn new() -> Self {
        Self::default()
    }

    // == Put ==
    /// Stores `item` under `vary`, replacing and superseding any previous one.
    ///
    /// Returns the replaced item.
    pub fn put(&mut self, vary: Vary, item: CacheItem) -> Option<CacheItem> {
        let previous = self.remove(&vary);
        self.entries.push((vary, item));
        previous
    }

    // == Get ==
    /// Exact lookup by selector.
    pub fn get(&self, vary: &Vary) -> Option<&CacheItem> {
        self.entries
            .iter()
            .find(|(stored, _)| stored == vary)
            .map(|(_, item)| item)
    }

    // == Find ==
    /// Returns the most recently stored item whose selector matches `request`.
    pub fn find(&self, request: &CacheRequest) -> Option<&CacheItem> {
        self.entries
            .iter()
            .rev()
            .find(|(vary, _)| vary.matches(request))
            .map(|(_, item)| item)
    }

    // == Remove ==
    pub fn remove(&mut self, vary: &Vary) -> Option<CacheItem> {
        let index = self.entries.iter().position(|(stored, _)| stored == vary)?;
        Some(self.entries.remove(index).1)
    }

    /// Selectors currently stored, oldest first.
    pub fn varies(&self) -> impl Iterator<Item = &Vary> {
        self.entries.iter().map(|(vary, _)| vary)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
