//! Eviction Policy Module
//!
//! Decides which URI family leaves the table when it is full. Policies only
//! track keys; they never touch the table themselves, so they can be driven
//! by synthetic access sequences in isolation.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use lru::LruCache;
use thiserror::Error;

// == Eviction Policy Trait ==
/// Tracks admitted keys and picks eviction victims.
pub trait EvictionPolicy<K>: Send + fmt::Debug {
    /// A key was admitted (or re-admitted).
    fn record_insert(&mut self, key: &K);

    /// A key was read. Unknown keys are ignored.
    fn record_access(&mut self, key: &K);

    /// Stops tracking `key`.
    fn remove(&mut self, key: &K);

    /// Removes and returns the key to evict next.
    fn victim(&mut self) -> Option<K>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// == Policy Kind ==
/// Error returned when parsing an unknown policy name.
#[derive(Error, Debug, Clone)]
#[error("Invalid eviction policy: {0}")]
pub struct ParsePolicyKindError(String);

/// Available eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyKind {
    /// Least recently used first
    #[default]
    Lru,
    /// Second-chance approximation of LRU
    Clock,
}

impl PolicyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Lru => "lru",
            PolicyKind::Clock => "clock",
        }
    }

    /// Creates an empty policy of this kind.
    pub fn build<K>(&self) -> Box<dyn EvictionPolicy<K>>
    where
        K: Clone + Eq + Hash + Send + fmt::Debug + 'static,
    {
        match self {
            PolicyKind::Lru => Box::new(LruPolicy::new()),
            PolicyKind::Clock => Box::new(ClockPolicy::new()),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = ParsePolicyKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lru" => Ok(PolicyKind::Lru),
            "clock" => Ok(PolicyKind::Clock),
            _ => Err(ParsePolicyKindError(s.to_string())),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == LRU Policy ==
/// Evicts the least recently admitted or accessed key.
pub struct LruPolicy<K: Hash + Eq> {
    /// Most recent at the head, victim at the tail
    order: LruCache<K, ()>,
}

impl<K: Hash + Eq> LruPolicy<K> {
    pub fn new() -> Self {
        Self {
            order: LruCache::unbounded(),
        }
    }

    /// Returns the next victim without removing it.
    pub fn peek_victim(&self) -> Option<&K> {
        self.order.peek_lru().map(|(key, _)| key)
    }
}

impl<K: Hash + Eq> Default for LruPolicy<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq> fmt::Debug for LruPolicy<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruPolicy")
            .field("len", &self.order.len())
            .finish()
    }
}

impl<K> EvictionPolicy<K> for LruPolicy<K>
where
    K: Clone + Eq + Hash + Send,
{
    fn record_insert(&mut self, key: &K) {
        self.order.put(key.clone(), ());
    }

    fn record_access(&mut self, key: &K) {
        self.order.promote(key);
    }

    fn remove(&mut self, key: &K) {
        self.order.pop(key);
    }

    fn victim(&mut self) -> Option<K> {
        self.order.pop_lru().map(|(key, _)| key)
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

// == Clock Policy ==
/// Second-chance eviction over a ring of reference bits.
///
/// Reads only set a bit, so they are cheaper than LRU reordering. The hand
/// clears set bits as it sweeps and evicts the first unreferenced key.
#[derive(Debug)]
pub struct ClockPolicy<K> {
    /// Hand position is the front
    ring: VecDeque<K>,
    referenced: HashMap<K, bool>,
}

impl<K: Clone + Eq + Hash> ClockPolicy<K> {
    pub fn new() -> Self {
        Self {
            ring: VecDeque::new(),
            referenced: HashMap::new(),
        }
    }

    /// Whether `key` is tracked.
    pub fn contains(&self, key: &K) -> bool {
        self.referenced.contains_key(key)
    }
}

impl<K: Clone + Eq + Hash> Default for ClockPolicy<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> EvictionPolicy<K> for ClockPolicy<K>
where
    K: Clone + Eq + Hash + Send + fmt::Debug,
{
    fn record_insert(&mut self, key: &K) {
        match self.referenced.get_mut(key) {
            Some(bit) => *bit = true,
            None => {
                self.referenced.insert(key.clone(), false);
                self.ring.push_back(key.clone());
            }
        }
    }

    fn record_access(&mut self, key: &K) {
        if let Some(bit) = self.referenced.get_mut(key) {
            *bit = true;
        }
    }

    fn remove(&mut self, key: &K) {
        if self.referenced.remove(key).is_some() {
            self.ring.retain(|k| k != key);
        }
    }

    fn victim(&mut self) -> Option<K> {
        // Every pass clears at least one bit, so this ends within two sweeps
        loop {
            let key = self.ring.pop_front()?;
            let referenced = match self.referenced.get(&key) {
                Some(bit) => *bit,
                None => continue,
            };
            if referenced {
                self.referenced.insert(key.clone(), false);
                self.ring.push_back(key);
            } else {
                self.referenced.remove(&key);
                return Some(key);
            }
        }
    }

    fn len(&self) -> usize {
        self.referenced.len()
    }
}
