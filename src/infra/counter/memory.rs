//! In-process counter store with passive expiry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::rate_limit::{CounterStore, StoreError};

#[derive(Debug, Clone, Copy)]
struct Counter {
    value: u64,
    expires_at: Option<Instant>,
}

impl Counter {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// Map size below which no sweep is attempted.
const MIN_SWEEP_LEN: usize = 64;

#[derive(Debug)]
struct Counters {
    entries: HashMap<String, Counter>,
    /// Sweep expired entries once the map reaches this size.
    sweep_at: usize,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            sweep_at: MIN_SWEEP_LEN,
        }
    }
}

impl Counters {
    /// Drop `key` if its window has passed.
    fn evict_if_expired(&mut self, key: &str, now: Instant) {
        if self.entries.get(key).is_some_and(|c| !c.is_live(now)) {
            self.entries.remove(key);
        }
    }

    /// Amortized sweep: the threshold doubles relative to what survives.
    fn maybe_sweep(&mut self, now: Instant) {
        if self.entries.len() < self.sweep_at {
            return;
        }
        self.entries.retain(|_, c| c.is_live(now));
        self.sweep_at = (self.entries.len() * 2).max(MIN_SWEEP_LEN);
    }

    fn bump(&mut self, key: &str, now: Instant) -> u64 {
        self.evict_if_expired(key, now);
        if !self.entries.contains_key(key) {
            self.maybe_sweep(now);
        }
        let counter = self.entries.entry(key.to_string()).or_insert(Counter {
            value: 0,
            expires_at: None,
        });
        counter.value += 1;
        counter.value
    }
}

/// Counters held in one map behind a single lock.
///
/// An expired key is removed when next touched, and expired keys are swept
/// whenever the map has doubled since the last sweep. Nothing runs in the
/// background.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    counters: Mutex<Counters>,
}

impl InMemoryCounterStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `key`, if it exists and has not expired.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<u64> {
        let now = Instant::now();
        let mut counters = self.counters.lock();
        counters.evict_if_expired(key, now);
        counters.entries.get(key).map(|c| c.value)
    }

    /// Number of keys currently held, expired ones not yet evicted included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counters.lock().entries.len()
    }

    /// Whether no keys are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn incr(&self, key: &str) -> Result<u64, StoreError> {
        Ok(self.counters.lock().bump(key, Instant::now()))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let now = Instant::now();
        if let Some(counter) = self.counters.lock().entries.get_mut(key) {
            counter.expires_at = Some(now + ttl);
        }
        Ok(())
    }

    async fn incr_window(&self, key: &str, window: Duration) -> Result<u64, StoreError> {
        let now = Instant::now();
        let mut counters = self.counters.lock();
        let count = counters.bump(key, now);
        if count == 1 {
            if let Some(counter) = counters.entries.get_mut(key) {
                counter.expires_at = Some(now + window);
            }
        }
        Ok(count)
    }
}
