//! # Sparse Paged Channel
//!
//! A [`SparseChannel`] is one growable-by-append, bounded-capacity-per-key
//! channel of raw values: a sorted sparse index of [`PageAllocation`]
//! metadata in front of a paged bump-allocated arena.
//!
//! ## Why Pages
//!
//! The key domain is a 2^64 Morton-code space with a few thousand live
//! keys. One buffer per key wastes allocator overhead across thousands of
//! sparse keys; one buffer sized to the domain is infeasible. Grouping
//! many keys' fixed-capacity allocations into shared fixed-size pages
//! gets both: bounded total memory and cheap per-key setup.
//!
//! ## Placement Policy
//!
//! Greedy bump allocation, no free list:
//!
//! ```text
//! page 0: [ key A ][ key B ][ key C ]      next_start advances right
//! page 1: [ key D ][ ...                   opened when A..C filled page 0
//! ```
//!
//! If the tail page still fits another `allocation_size` block, the new
//! allocation lands at the next offset there; otherwise a fresh page is
//! opened at offset 0. Space inside a page is never reclaimed once a
//! key's allocation exists; only dropping the whole channel frees pages.
//!
//! ## Laziness
//!
//! Only the page table (a `Vec` of page slots) is reserved at
//! construction. Page buffers are allocated zeroed on first need and
//! their addresses are stable for the channel's lifetime, so borrowed
//! views over them stay valid.
//!
//! ## Zero-Copy Views
//!
//! [`slice`](SparseChannel::slice) returns a borrowed `&[T]` over the
//! key's written region. The channel exclusively owns all page memory;
//! the borrow checker ties the view to the channel borrow, so a view can
//! never outlive the arena.
//!
//! ## Thread Safety
//!
//! Mutations of the index (`add_key`) must be serialized. Appends to
//! already-created allocations of *different* keys touch disjoint page
//! regions and may proceed from different tasks under an external
//! discipline; read-only calls on a quiescent channel are safe anywhere.

use std::sync::Arc;

use eyre::{bail, ensure, Result};
use zerocopy::{FromBytes, Immutable, IntoBytes};

use crate::arena::PageAllocation;
use crate::error::StoreError;
use crate::index::{SearchResult, SortedSparseIndex};
use crate::memory::PageBudget;

/// Plain-old-data bound for channel elements.
///
/// The zerocopy traits guarantee every bit pattern is valid and the type
/// has no padding or drop glue, so pages can be handed out zeroed and
/// regions copied byte-wise.
pub trait Element: FromBytes + IntoBytes + Immutable + Copy + 'static {}

impl<T> Element for T where T: FromBytes + IntoBytes + Immutable + Copy + 'static {}

/// Construction parameters for one channel.
#[derive(Debug, Clone, Copy)]
pub struct ChannelConfig {
    /// Fixed capacity granted to each key, in values.
    pub allocation_size: usize,
    /// Values per page; must be a multiple of `allocation_size`.
    pub page_size: usize,
    /// Hard bound on pages for a standalone channel's own budget.
    pub max_pages: usize,
    /// Fixed capacity of the key index.
    pub max_keys: usize,
}

impl ChannelConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.allocation_size > 0, "allocation_size must be positive");
        ensure!(
            self.page_size >= self.allocation_size
                && self.page_size % self.allocation_size == 0,
            "page_size {} must be a positive multiple of allocation_size {}",
            self.page_size,
            self.allocation_size
        );
        ensure!(self.max_pages > 0, "max_pages must be positive");
        ensure!(self.max_keys > 0, "max_keys must be positive");
        Ok(())
    }

    /// Allocations that fit in one page.
    pub fn allocations_per_page(&self) -> usize {
        self.page_size / self.allocation_size
    }
}

/// Sorted sparse index + paged bump arena for one channel of raw values.
pub struct SparseChannel<T: Element> {
    index: SortedSparseIndex<PageAllocation>,
    pages: Vec<Box<[T]>>,
    /// Bump offset of the next free block in the tail page.
    next_start: usize,
    allocation_size: usize,
    page_size: usize,
    budget: Arc<PageBudget>,
}

impl<T: Element> SparseChannel<T> {
    /// Create a standalone channel with its own page budget.
    pub fn new(config: ChannelConfig) -> Result<Self> {
        let budget = Arc::new(PageBudget::with_limit(config.max_pages));
        Self::with_budget(config, budget)
    }

    /// Create a channel drawing pages from a shared budget.
    pub fn with_budget(config: ChannelConfig, budget: Arc<PageBudget>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            index: SortedSparseIndex::new(config.max_keys),
            pages: Vec::with_capacity(config.max_pages),
            next_start: 0,
            allocation_size: config.allocation_size,
            page_size: config.page_size,
            budget,
        })
    }

    /// Whether the next `add_key` must open a new page.
    pub fn needs_new_page(&self) -> bool {
        self.pages.is_empty() || self.next_start + self.allocation_size > self.page_size
    }

    /// Reserve a fixed-capacity allocation for a new key.
    ///
    /// Placement is the greedy bump policy described in the module docs.
    /// Fails with `KeyAlreadyExists`, `IndexFull`, or
    /// `PageBudgetExhausted`; on failure the channel is unchanged.
    pub fn add_key(&mut self, key: u64) -> Result<()> {
        let slot = match self.index.search(key) {
            SearchResult::Found(_) => bail!(StoreError::KeyAlreadyExists { key }),
            SearchResult::NotFound(slot) => slot,
        };
        ensure!(
            !self.index.is_full(),
            StoreError::IndexFull {
                capacity: self.index.capacity(),
            }
        );

        if self.needs_new_page() {
            self.budget.acquire(1)?;
            self.pages
                .push(vec![T::new_zeroed(); self.page_size].into_boxed_slice());
            self.next_start = 0;
        }

        let alloc = PageAllocation::new(
            (self.pages.len() - 1) as u32,
            self.next_start as u32,
            self.allocation_size as u32,
        );
        self.next_start += self.allocation_size;

        // Cannot fail: capacity was checked above, the slot came from the
        // search, and nothing else mutated the index since.
        self.index.insert_at(slot, key, alloc)
    }

    /// Append `data` contiguously after the key's previously written
    /// region. The allocation never grows past its fixed capacity.
    pub fn append(&mut self, key: u64, data: &[T]) -> Result<()> {
        let slot = match self.index.search(key) {
            SearchResult::Found(slot) => slot,
            SearchResult::NotFound(_) => bail!(StoreError::KeyNotFound { key }),
        };
        let alloc = self.index.value_at_mut(slot);
        let remaining = alloc.remaining() as usize;
        ensure!(
            data.len() <= remaining,
            StoreError::CapacityExceeded {
                key,
                requested: data.len(),
                remaining,
            }
        );

        let page_idx = alloc.page() as usize;
        let write_at = alloc.end() as usize;
        self.pages[page_idx][write_at..write_at + data.len()].copy_from_slice(data);
        alloc.advance(data.len() as u32);
        Ok(())
    }

    /// Zero-copy view over the key's written region.
    pub fn slice(&self, key: u64) -> Result<&[T]> {
        let alloc = self.index.get(key)?;
        let page = &self.pages[alloc.page() as usize];
        Ok(&page[alloc.start() as usize..alloc.end() as usize])
    }

    /// The key's allocation metadata, by value.
    pub fn allocation(&self, key: u64) -> Result<PageAllocation> {
        self.index.get(key).copied()
    }

    pub fn contains(&self, key: u64) -> bool {
        self.index.contains(key)
    }

    pub fn len(&self, key: u64) -> Result<usize> {
        Ok(self.index.get(key)?.len() as usize)
    }

    pub fn remaining(&self, key: u64) -> Result<usize> {
        Ok(self.index.get(key)?.remaining() as usize)
    }

    pub fn is_full(&self, key: u64) -> Result<bool> {
        Ok(self.index.get(key)?.is_full())
    }

    /// Live keys, ascending.
    pub fn keys(&self) -> impl Iterator<Item = u64> + '_ {
        self.index.keys()
    }

    pub fn key_count(&self) -> usize {
        self.index.len()
    }

    pub fn key_capacity(&self) -> usize {
        self.index.capacity()
    }

    pub fn index_is_full(&self) -> bool {
        self.index.is_full()
    }

    /// Pages allocated so far (lazily, on first need).
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn allocation_size(&self) -> usize {
        self.allocation_size
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn budget(&self) -> &PageBudget {
        &self.budget
    }
}

impl<T: Element> Drop for SparseChannel<T> {
    fn drop(&mut self) {
        // Whole-arena teardown is the only way pages are freed; hand the
        // budget back so a sibling store can reuse it.
        self.budget.release(self.pages.len());
    }
}
