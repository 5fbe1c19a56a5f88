//! Memo stores: write-once key/value caches used to memoize recurrences.
//!
//! A store grows monotonically over the lifetime of an evaluation session.
//! Entries are never removed and never overwritten; storing a conflicting
//! value for a populated key is an error, because it means the computation
//! that produced it was not deterministic.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Condvar, Mutex};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoError {
    /// A different value is already memoized under this key. Signals a
    /// non-deterministic computation, not a cache problem.
    #[error("conflicting value already memoized for key {key}")]
    DuplicateKey { key: String },
    /// A dense store was asked about a key beyond its pre-sized bound.
    #[error("key {key} out of range for dense memo store of capacity {capacity}")]
    KeyOutOfRange { key: usize, capacity: usize },
}

/// A write-once mapping from sub-problem keys to computed values.
///
/// Implementations differ in key flexibility and access cost, never in
/// contract: [`SparseMemo`] takes any hashable key, [`DenseMemo`] takes
/// `usize` keys below a fixed bound in exchange for O(1) slot access.
pub trait MemoStore<K, V> {
    /// Look up a previously stored value. No side effects.
    fn get(&self, key: &K) -> Option<&V>;

    /// Store a value for a key. Re-inserting the *same* value is accepted
    /// (idempotent); a conflicting value is [`MemoError::DuplicateKey`].
    fn insert(&mut self, key: K, value: V) -> Result<(), MemoError>;

    /// Number of populated entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the cached value for `key`, or run `compute` exactly once,
    /// store its result, and return it.
    fn get_or_compute(&mut self, key: K, compute: impl FnOnce() -> V) -> Result<V, MemoError>
    where
        K: Clone,
        V: Clone,
        Self: Sized,
    {
        if let Some(v) = self.get(&key) {
            return Ok(v.clone());
        }
        let value = compute();
        self.insert(key, value.clone())?;
        Ok(value)
    }
}

/// Hash map backed store: arbitrary `Eq + Hash` keys, no sizing needed.
#[derive(Debug, Clone, Default)]
pub struct SparseMemo<K, V> {
    entries: HashMap<K, V>,
}

impl<K, V> SparseMemo<K, V> {
    pub fn new() -> Self {
        SparseMemo {
            entries: HashMap::new(),
        }
    }
}

impl<K, V> MemoStore<K, V> for SparseMemo<K, V>
where
    K: Eq + Hash + fmt::Debug,
    V: PartialEq,
{
    fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    fn insert(&mut self, key: K, value: V) -> Result<(), MemoError> {
        match self.entries.entry(key) {
            Entry::Occupied(occupied) if *occupied.get() == value => Ok(()),
            Entry::Occupied(occupied) => Err(MemoError::DuplicateKey {
                key: format!("{:?}", occupied.key()),
            }),
            Entry::Vacant(vacant) => {
                vacant.insert(value);
                Ok(())
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Pre-sized slot-per-key store for `usize` keys in `0..capacity`.
///
/// Pays for the up-front bound with O(1) slot access and no hashing.
/// Keys at or beyond the bound are [`MemoError::KeyOutOfRange`].
#[derive(Debug, Clone)]
pub struct DenseMemo<V> {
    slots: Vec<Option<V>>,
    populated: usize,
}

impl<V> DenseMemo<V> {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        DenseMemo {
            slots,
            populated: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl<V: PartialEq> MemoStore<usize, V> for DenseMemo<V> {
    fn get(&self, key: &usize) -> Option<&V> {
        self.slots.get(*key).and_then(|slot| slot.as_ref())
    }

    fn insert(&mut self, key: usize, value: V) -> Result<(), MemoError> {
        let capacity = self.slots.len();
        match self.slots.get_mut(key) {
            None => Err(MemoError::KeyOutOfRange { key, capacity }),
            Some(Some(existing)) if *existing == value => Ok(()),
            Some(Some(_)) => Err(MemoError::DuplicateKey {
                key: format!("{key}"),
            }),
            Some(slot) => {
                *slot = Some(value);
                self.populated += 1;
                Ok(())
            }
        }
    }

    fn len(&self) -> usize {
        self.populated
    }
}

/// Single-flight shared store: a cheaply cloneable handle over one cache
/// that any number of threads may hit concurrently.
///
/// [`SharedMemo::get_or_compute`] guarantees at most one in-flight
/// computation per key: concurrent callers for an uncomputed key block until
/// the first caller's computation lands, then share its result. This is the
/// optional concurrent extension of the memo contract; the single-threaded
/// stores above are the base contract.
pub struct SharedMemo<K, V> {
    inner: Arc<Inner<K, V>>,
}

struct Inner<K, V> {
    state: Mutex<SharedState<K, V>>,
    computed: Condvar,
}

struct SharedState<K, V> {
    done: HashMap<K, V>,
    in_flight: HashSet<K>,
}

impl<K, V> Clone for SharedMemo<K, V> {
    fn clone(&self) -> Self {
        SharedMemo {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Default for SharedMemo<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> SharedMemo<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        SharedMemo {
            inner: Arc::new(Inner {
                state: Mutex::new(SharedState {
                    done: HashMap::new(),
                    in_flight: HashSet::new(),
                }),
                computed: Condvar::new(),
            }),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let state = self.inner.state.lock().unwrap();
        state.done.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.state.lock().unwrap().done.len()
    }

    /// Return the cached value for `key`, or run `compute` and store its
    /// result. `compute` runs outside the lock; callers racing on the same
    /// key wait for the winner instead of computing again.
    pub fn get_or_compute(&self, key: K, compute: impl FnOnce() -> V) -> V {
        let mut state = self.inner.state.lock().unwrap();
        loop {
            if let Some(v) = state.done.get(&key) {
                return v.clone();
            }
            if state.in_flight.insert(key.clone()) {
                break;
            }
            // someone else is computing this key
            state = self.inner.computed.wait(state).unwrap();
        }
        drop(state);

        // if compute panics the guard clears the in-flight marker so
        // blocked callers wake up and retry instead of hanging
        let guard = FlightGuard {
            inner: &self.inner,
            key: key.clone(),
        };
        let value = compute();

        let mut state = self.inner.state.lock().unwrap();
        state.done.insert(key, value.clone());
        drop(state);
        drop(guard);
        value
    }
}

struct FlightGuard<'a, K: Eq + Hash, V> {
    inner: &'a Inner<K, V>,
    key: K,
}

impl<K: Eq + Hash, V> Drop for FlightGuard<'_, K, V> {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock().unwrap();
        state.in_flight.remove(&self.key);
        drop(state);
        self.inner.computed.notify_all();
    }
}
