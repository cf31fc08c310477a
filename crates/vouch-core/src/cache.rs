//! Keyed cache for compiled artifacts
//!
//! Entries live until they are overwritten, removed or the cache is
//! cleared. There is no expiry and no capacity bound.
//!
//! Resolution through [`CacheManager::get_or_try_insert_with`] is
//! single-flight: while one caller compiles for a key, every other caller
//! asking for the same key blocks on that compilation and receives its
//! outcome. Failed compilations are never stored, so the next caller
//! retries from scratch.
//!
//! Copyright (c) 2025 Vouch Team
//! Licensed under the Apache-2.0 license

use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of one compilation, shared by every caller that waited on it
enum FlightState<T, E> {
    Pending,
    Ready(Arc<T>),
    Failed(E),
    /// The compiling caller panicked before producing a result
    Abandoned,
}

struct Flight<T, E> {
    state: Mutex<FlightState<T, E>>,
    done: Condvar,
}

impl<T, E: Clone> Flight<T, E> {
    fn new() -> Self {
        Self {
            state: Mutex::new(FlightState::Pending),
            done: Condvar::new(),
        }
    }

    fn finish(&self, outcome: FlightState<T, E>) {
        *self.state.lock() = outcome;
        self.done.notify_all();
    }

    /// Block until the flight resolves; `None` when it was abandoned
    fn wait(&self) -> Option<Result<Arc<T>, E>> {
        let mut state = self.state.lock();
        while matches!(*state, FlightState::Pending) {
            self.done.wait(&mut state);
        }
        match &*state {
            FlightState::Ready(value) => Some(Ok(Arc::clone(value))),
            FlightState::Failed(err) => Some(Err(err.clone())),
            FlightState::Pending | FlightState::Abandoned => None,
        }
    }
}

enum Slot<T, E> {
    Pending(Arc<Flight<T, E>>),
    Ready(Arc<T>),
}

enum Claim<T, E> {
    Hit(Arc<T>),
    Wait(Arc<Flight<T, E>>),
    Lead(Arc<Flight<T, E>>),
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Ready entries
    pub entries: usize,
    /// Compilations currently in flight
    pub pending: usize,
    pub hits: u64,
    /// Lookups that started a compilation
    pub misses: u64,
    /// Lookups that waited on another caller's compilation
    pub coalesced: u64,
    /// Compilations that returned an error
    pub failures: u64,
}

/// Thread-safe map from cache key to a shared artifact
pub struct CacheManager<T, E> {
    slots: Mutex<HashMap<String, Slot<T, E>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    failures: AtomicU64,
}

impl<T, E> fmt::Debug for CacheManager<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheManager")
            .field("keys", &self.slots.lock().len())
            .finish()
    }
}

impl<T, E> Default for CacheManager<T, E> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }
}

impl<T, E: Clone> CacheManager<T, E> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ready artifact stored under `key`, if any.
    ///
    /// Compilations still in flight are reported as absent.
    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        match self.slots.lock().get(key) {
            Some(Slot::Ready(value)) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    /// Store an artifact, overwriting any existing entry for `key`.
    pub fn set(&self, key: impl Into<String>, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.slots
            .lock()
            .insert(key.into(), Slot::Ready(Arc::clone(&value)));
        value
    }

    /// Return the artifact for `key`, compiling it with `compile` on a miss.
    ///
    /// Only one compilation runs per key at a time. Callers arriving while
    /// it runs share its result, including its error. Errors are not
    /// stored.
    pub fn get_or_try_insert_with<F>(&self, key: &str, compile: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let flight = loop {
            match self.claim(key) {
                Claim::Hit(value) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(key, "Cache hit");
                    return Ok(value);
                }
                Claim::Wait(flight) => {
                    self.coalesced.fetch_add(1, Ordering::Relaxed);
                    debug!(key, "Waiting on in-flight compilation");
                    if let Some(outcome) = flight.wait() {
                        return outcome;
                    }
                    // The leader panicked; try to claim the key again
                }
                Claim::Lead(flight) => break flight,
            }
        };

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key, "Cache miss, compiling");

        let mut guard = AbandonGuard {
            cache: self,
            key,
            flight: &flight,
            armed: true,
        };
        let result = compile();
        guard.armed = false;

        match result {
            Ok(value) => {
                let value = Arc::new(value);
                {
                    let mut slots = self.slots.lock();
                    if owns_slot(&slots, key, &flight) {
                        slots.insert(key.to_string(), Slot::Ready(Arc::clone(&value)));
                    }
                }
                flight.finish(FlightState::Ready(Arc::clone(&value)));
                Ok(value)
            }
            Err(err) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(key, "Compilation failed, entry not cached");
                self.release(key, &flight);
                flight.finish(FlightState::Failed(err.clone()));
                Err(err)
            }
        }
    }

    fn claim(&self, key: &str) -> Claim<T, E> {
        let mut slots = self.slots.lock();
        match slots.get(key) {
            Some(Slot::Ready(value)) => Claim::Hit(Arc::clone(value)),
            Some(Slot::Pending(flight)) => Claim::Wait(Arc::clone(flight)),
            None => {
                let flight = Arc::new(Flight::new());
                slots.insert(key.to_string(), Slot::Pending(Arc::clone(&flight)));
                Claim::Lead(flight)
            }
        }
    }

    /// Drop the pending slot for `key` if it still belongs to `flight`
    fn release(&self, key: &str, flight: &Arc<Flight<T, E>>) {
        let mut slots = self.slots.lock();
        if owns_slot(&slots, key, flight) {
            slots.remove(key);
        }
    }

    /// Remove the entry for `key`. Returns `true` if one existed.
    pub fn remove(&self, key: &str) -> bool {
        self.slots.lock().remove(key).is_some()
    }

    /// Remove every entry.
    ///
    /// Compilations in flight still hand their result to their waiters but
    /// are not stored.
    pub fn clear(&self) {
        self.slots.lock().clear();
    }

    /// Check if a ready entry exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        matches!(self.slots.lock().get(key), Some(Slot::Ready(_)))
    }

    /// Number of ready entries.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    /// Whether no ready entry exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let (entries, pending) = {
            let slots = self.slots.lock();
            let entries = slots
                .values()
                .filter(|slot| matches!(slot, Slot::Ready(_)))
                .count();
            (entries, slots.len() - entries)
        };
        CacheStats {
            entries,
            pending,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

fn owns_slot<T, E>(slots: &HashMap<String, Slot<T, E>>, key: &str, flight: &Arc<Flight<T, E>>) -> bool {
    matches!(slots.get(key), Some(Slot::Pending(current)) if Arc::ptr_eq(current, flight))
}

/// Releases the key and wakes waiters if the compiler unwinds
struct AbandonGuard<'a, T, E: Clone> {
    cache: &'a CacheManager<T, E>,
    key: &'a str,
    flight: &'a Arc<Flight<T, E>>,
    armed: bool,
}

impl<T, E: Clone> Drop for AbandonGuard<'_, T, E> {
    fn drop(&mut self) {
        if self.armed {
            warn!(key = self.key, "Compilation panicked, releasing cache key");
            self.cache.release(self.key, self.flight);
            self.flight.finish(FlightState::Abandoned);
        }
    }
}
