//! Strategy-scoped read cache.

use hv_yield_domain::enums::Chain;
use std::collections::HashMap;
use std::fmt;

/// Key of a cached chain read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub network: Chain,
    pub contract: String,
    pub block: u64,
    /// Pool the read is scoped to, if any.
    pub pool: Option<String>,
}

impl CacheKey {
    /// Creates a key for a read not tied to a pool.
    pub fn new(network: Chain, contract: impl Into<String>, block: u64) -> Self {
        Self {
            network,
            contract: contract.into().to_lowercase(),
            block,
            pool: None,
        }
    }

    /// Scopes the key to a pool.
    #[must_use]
    pub fn with_pool(mut self, pool: impl Into<String>) -> Self {
        self.pool = Some(pool.into().to_lowercase());
        self
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@{}", self.network, self.contract, self.block)?;
        if let Some(pool) = &self.pool {
            write!(f, "/{pool}")?;
        }
        Ok(())
    }
}

/// Flat cache of chain reads, owned by one strategy for one walk.
#[derive(Debug, Clone)]
pub struct ReadCache<V> {
    entries: HashMap<CacheKey, V>,
    hits: u64,
    misses: u64,
}

impl<V> Default for ReadCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<V: Clone> ReadCache<V> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the cached value, counting the hit or miss.
    pub fn get(&mut self, key: &CacheKey) -> Option<V> {
        match self.entries.get(key) {
            Some(value) => {
                self.hits += 1;
                Some(value.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: CacheKey, value: V) {
        self.entries.insert(key, value);
    }

    /// Drops every entry and resets the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses
    }
}
