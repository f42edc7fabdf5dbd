//! # Page Allocation Metadata
//!
//! A [`PageAllocation`] is the fixed-capacity window inside one page
//! reserved for one key. It is the payload stored in the sorted sparse
//! index: resolving a key yields the page index and offsets needed to
//! address the key's region without touching page memory.
//!
//! Invariants: `len <= capacity` and `start + capacity <= page_size`
//! (the latter is guaranteed by the bump placement in the channel).

/// Fixed-capacity window inside one page, reserved for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageAllocation {
    page: u32,
    start: u32,
    capacity: u32,
    length: u32,
}

impl PageAllocation {
    pub(crate) fn new(page: u32, start: u32, capacity: u32) -> Self {
        Self {
            page,
            start,
            capacity,
            length: 0,
        }
    }

    /// Index of the owning page in the arena's page table.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Offset of the window within the owning page.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Fixed capacity of the window, in values.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of values written so far.
    pub fn len(&self) -> u32 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn is_full(&self) -> bool {
        self.length == self.capacity
    }

    /// Values that can still be appended.
    pub fn remaining(&self) -> u32 {
        self.capacity - self.length
    }

    /// Page offset one past the last written value.
    pub fn end(&self) -> u32 {
        self.start + self.length
    }

    /// Advance the written length after a copy into the page.
    pub(crate) fn advance(&mut self, count: u32) {
        debug_assert!(count <= self.remaining());
        self.length += count;
    }
}
