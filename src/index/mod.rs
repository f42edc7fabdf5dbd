//! # Sparse Key Index
//!
//! Sorted-array mapping from sparse Morton-code keys to dense slots.
//! See [`sparse`] for contracts and the search-result convention.

mod sparse;

pub use sparse::{SearchResult, SortedSparseIndex};
