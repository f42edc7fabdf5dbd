//! # Sorted Sparse Index
//!
//! This module maps an arbitrarily sparse, unbounded unsigned key domain
//! (up to the full `u64` range of Morton codes) onto a dense slot domain
//! `[0, len)`. Two parallel sequences back the mapping:
//!
//! ```text
//! keys:    [ 0x08 | 0x11 | 0x4a | 0xd3 ]   strictly ascending, unique
//! payload: [  p0  |  p1  |  p2  |  p3  ]   same length
//! ```
//!
//! ## Contracts
//!
//! - `keys[i] < keys[i+1]` for every valid `i` (unsigned comparison)
//! - `keys.len() == payload.len() == len() <= capacity()`
//! - lookup is O(log n) binary search; insertion and removal shift the
//!   tail and are O(n) worst case
//! - iteration is a lazy, restartable ascending-key walk with no gaps
//!
//! ## Search Result Convention
//!
//! [`search`](SortedSparseIndex::search) returns
//! [`SearchResult::NotFound`] carrying the correct insertion index for a
//! missing key, so callers that go on to insert reuse the position
//! instead of searching twice. For a miss at index `i`:
//! `keys[i-1] < key < keys[i]`.
//!
//! ## Workload Fit
//!
//! The octree build workload is populate-then-process: many distinct
//! keys inserted once in arbitrary order, then looked up repeatedly.
//! O(n) shift-insertion is an acceptable trade for the compact layout
//! and cache-friendly search; the structure is not meant for sustained
//! high-frequency insert/remove churn.
//!
//! ## Thread Safety
//!
//! No interior synchronization. Mutations (`add`, `remove`) must be
//! serialized by the caller; concurrent read-only calls on an index that
//! is not being mutated are safe.

use eyre::{bail, ensure, Result};

use crate::error::StoreError;

/// Outcome of a key search: the slot holding the key, or the slot where
/// it would be inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchResult {
    Found(usize),
    NotFound(usize),
}

/// Sorted-array-backed map from sparse `u64` keys to dense payload slots.
///
/// Capacity is fixed at construction; both backing vectors are reserved
/// upfront and never reallocate.
#[derive(Debug)]
pub struct SortedSparseIndex<V> {
    keys: Vec<u64>,
    payload: Vec<V>,
    capacity: usize,
}

impl<V> SortedSparseIndex<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            payload: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.keys.len() == self.capacity
    }

    /// Binary search over the key sequence.
    pub fn search(&self, key: u64) -> SearchResult {
        match self.keys.binary_search(&key) {
            Ok(slot) => SearchResult::Found(slot),
            Err(slot) => SearchResult::NotFound(slot),
        }
    }

    pub fn contains(&self, key: u64) -> bool {
        matches!(self.search(key), SearchResult::Found(_))
    }

    pub fn get(&self, key: u64) -> Result<&V> {
        match self.search(key) {
            SearchResult::Found(slot) => Ok(&self.payload[slot]),
            SearchResult::NotFound(_) => bail!(StoreError::KeyNotFound { key }),
        }
    }

    pub fn get_mut(&mut self, key: u64) -> Result<&mut V> {
        match self.search(key) {
            SearchResult::Found(slot) => Ok(&mut self.payload[slot]),
            SearchResult::NotFound(_) => bail!(StoreError::KeyNotFound { key }),
        }
    }

    /// Insert a new entry, shifting subsequent entries one slot right.
    ///
    /// Fails with [`StoreError::IndexFull`] at capacity and
    /// [`StoreError::KeyAlreadyExists`] on duplicates; duplicates are
    /// never merged.
    pub fn add(&mut self, key: u64, value: V) -> Result<()> {
        match self.search(key) {
            SearchResult::Found(_) => bail!(StoreError::KeyAlreadyExists { key }),
            SearchResult::NotFound(slot) => self.insert_at(slot, key, value),
        }
    }

    /// Insert at a slot previously obtained from [`search`](Self::search),
    /// avoiding a second search.
    pub(crate) fn insert_at(&mut self, slot: usize, key: u64, value: V) -> Result<()> {
        ensure!(
            !self.is_full(),
            StoreError::IndexFull {
                capacity: self.capacity,
            }
        );
        debug_assert!(slot == 0 || self.keys[slot - 1] < key);
        debug_assert!(slot == self.keys.len() || key < self.keys[slot]);

        self.keys.insert(slot, key);
        self.payload.insert(slot, value);
        Ok(())
    }

    /// Overwrite the payload at the key's slot in place.
    pub fn set(&mut self, key: u64, value: V) -> Result<()> {
        *self.get_mut(key)? = value;
        Ok(())
    }

    /// Remove an entry, shifting subsequent entries one slot left.
    pub fn remove(&mut self, key: u64) -> Result<V> {
        match self.search(key) {
            SearchResult::Found(slot) => {
                self.keys.remove(slot);
                Ok(self.payload.remove(slot))
            }
            SearchResult::NotFound(_) => bail!(StoreError::KeyNotFound { key }),
        }
    }

    /// Slot-addressed payload access for callers that resolved the slot
    /// through [`search`](Self::search).
    pub(crate) fn value_at_mut(&mut self, slot: usize) -> &mut V {
        &mut self.payload[slot]
    }

    /// Ascending key sequence.
    pub fn keys(&self) -> impl Iterator<Item = u64> + '_ {
        self.keys.iter().copied()
    }

    /// Lazy ascending iteration over `(key, payload)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &V)> {
        self.keys.iter().copied().zip(self.payload.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

    fn assert_sorted(index: &SortedSparseIndex<u32>) {
        let keys: Vec<u64> = index.keys().collect();
        for window in keys.windows(2) {
            assert!(window[0] < window[1], "keys out of order: {keys:?}");
        }
    }

    #[test]
    fn add_keeps_keys_sorted_regardless_of_order() {
        let mut index = SortedSparseIndex::new(8);
        for key in [0x4a, 0x08, 0xd3, 0x11] {
            index.add(key, key as u32).unwrap();
            assert_sorted(&index);
        }

        assert_eq!(index.keys().collect::<Vec<_>>(), vec![0x08, 0x11, 0x4a, 0xd3]);
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn search_miss_reports_insertion_slot() {
        let mut index = SortedSparseIndex::new(8);
        for key in [10u64, 20, 30] {
            index.add(key, 0u32).unwrap();
        }

        assert_eq!(index.search(5), SearchResult::NotFound(0));
        assert_eq!(index.search(15), SearchResult::NotFound(1));
        assert_eq!(index.search(25), SearchResult::NotFound(2));
        assert_eq!(index.search(35), SearchResult::NotFound(3));
        assert_eq!(index.search(20), SearchResult::Found(1));
    }

    #[test]
    fn get_missing_key_fails() {
        let index: SortedSparseIndex<u32> = SortedSparseIndex::new(4);
        let err = index.get(99).unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::KeyNotFound { key: 99 })
        );
    }

    #[test]
    fn duplicate_key_rejected_not_merged() {
        let mut index = SortedSparseIndex::new(4);
        index.add(7, 1u32).unwrap();

        let err = index.add(7, 2u32).unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::KeyAlreadyExists { key: 7 })
        );
        assert_eq!(*index.get(7).unwrap(), 1);
    }

    #[test]
    fn add_at_capacity_fails() {
        let mut index = SortedSparseIndex::new(2);
        index.add(1, 0u32).unwrap();
        index.add(2, 0u32).unwrap();
        assert!(index.is_full());

        let err = index.add(3, 0u32).unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::IndexFull { capacity: 2 })
        );
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn set_overwrites_in_place() {
        let mut index = SortedSparseIndex::new(4);
        index.add(5, 10u32).unwrap();
        index.set(5, 20).unwrap();

        assert_eq!(*index.get(5).unwrap(), 20);
        assert!(index.set(6, 0).is_err());
    }

    #[test]
    fn remove_shifts_tail_left() {
        let mut index = SortedSparseIndex::new(8);
        for key in [1u64, 2, 3, 4] {
            index.add(key, key as u32 * 10).unwrap();
        }

        assert_eq!(index.remove(2).unwrap(), 20);
        assert_eq!(index.len(), 3);
        assert_eq!(index.keys().collect::<Vec<_>>(), vec![1, 3, 4]);
        assert_eq!(*index.get(3).unwrap(), 30);
        assert!(index.remove(2).is_err());
        assert_sorted(&index);
    }

    #[test]
    fn iteration_is_dense_ascending_and_restartable() {
        let mut index = SortedSparseIndex::new(8);
        for key in [900u64, 3, 77, 12] {
            index.add(key, key as u32).unwrap();
        }

        let first: Vec<_> = index.iter().map(|(k, v)| (k, *v)).collect();
        let second: Vec<_> = index.iter().map(|(k, v)| (k, *v)).collect();

        assert_eq!(first, vec![(3, 3), (12, 12), (77, 77), (900, 900)]);
        assert_eq!(first, second);
    }

    #[test]
    fn randomized_add_remove_preserves_invariants() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut keys: Vec<u64> = (0..64).map(|i| i * 1000 + 17).collect();
        keys.shuffle(&mut rng);

        let mut index = SortedSparseIndex::new(64);
        for &key in &keys {
            index.add(key, key as u32).unwrap();
            assert_sorted(&index);
        }

        keys.shuffle(&mut rng);
        for &key in keys.iter().take(32) {
            index.remove(key).unwrap();
            assert_sorted(&index);
        }
        assert_eq!(index.len(), 32);

        for &key in keys.iter().skip(32) {
            assert_eq!(*index.get(key).unwrap(), key as u32);
        }
    }

    #[test]
    fn capacity_never_reallocates() {
        let mut index = SortedSparseIndex::new(16);
        let before = index.keys.as_ptr();
        for key in 0..16u64 {
            index.add(key, key as u32).unwrap();
        }
        assert_eq!(index.keys.as_ptr(), before);
    }
}
