// Copyright 2026 the Textblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small bounded cache for resolved font handles.
//!
//! Engines resolve a (family, style) pair to a concrete font instance on
//! every probe and every shape; resolution is the expensive step, so engines
//! keep a [`FontCache`] keyed by whatever identifies an instance for them.

use core::fmt;

/// A borrowed key used to look up a cache entry without building the owned
/// key up front. Building the owned key may allocate, so it is deferred to
/// the miss path via [`CacheKey::into_key`].
pub trait CacheKey<K> {
    /// Whether this lookup refers to the given stored key.
    fn matches(&self, key: &K) -> bool;
    /// Converts the lookup into an owned key for insertion.
    fn into_key(self) -> K;
}

/// Owned keys look themselves up.
impl<K: PartialEq> CacheKey<K> for K {
    fn matches(&self, key: &K) -> bool {
        self == key
    }

    fn into_key(self) -> K {
        self
    }
}

struct Slot<K, V> {
    epoch: u64,
    key: K,
    value: V,
}

/// A least-recently-used cache of font instances.
///
/// Lookup is a linear scan, so this is only suitable for a low bound in the
/// order of tens of entries, which is plenty for the handful of families and
/// sizes a block cycles through.
pub struct FontCache<K, V> {
    slots: Vec<Slot<K, V>>,
    epoch: u64,
    max_entries: usize,
}

impl<K, V> FontCache<K, V> {
    /// Creates a cache that holds at most `max_entries` instances.
    pub fn new(max_entries: usize) -> Self {
        Self {
            slots: Vec::new(),
            epoch: 0,
            max_entries,
        }
    }

    /// Number of cached instances.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the instance for `key`, resolving it with `resolve` on a miss.
    ///
    /// A miss that finds the cache full replaces the least recently used
    /// entry.
    pub fn entry<'a>(&'a mut self, key: impl CacheKey<K>, resolve: impl FnOnce() -> V) -> &'a V {
        match self.find_slot(key, resolve) {
            (true, index) => {
                let slot = &mut self.slots[index];
                slot.epoch = self.epoch;
                &slot.value
            }
            (false, index) => {
                self.epoch += 1;
                let slot = &mut self.slots[index];
                slot.epoch = self.epoch;
                &slot.value
            }
        }
    }

    fn find_slot(&mut self, key: impl CacheKey<K>, resolve: impl FnOnce() -> V) -> (bool, usize) {
        let epoch = self.epoch;
        let mut oldest_epoch = epoch;
        let mut oldest_index = 0;
        for (i, slot) in self.slots.iter().enumerate() {
            if key.matches(&slot.key) {
                return (true, i);
            }
            if slot.epoch < oldest_epoch {
                oldest_epoch = slot.epoch;
                oldest_index = i;
            }
        }
        if self.slots.len() < self.max_entries {
            oldest_index = self.slots.len();
            self.slots.push(Slot {
                epoch,
                key: key.into_key(),
                value: resolve(),
            });
        } else {
            let slot = &mut self.slots[oldest_index];
            slot.epoch = epoch;
            slot.key = key.into_key();
            slot.value = resolve();
        }
        (false, oldest_index)
    }
}

impl<K, V> fmt::Debug for FontCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontCache")
            .field("len", &self.slots.len())
            .field("max_entries", &self.max_entries)
            .finish_non_exhaustive()
    }
}
