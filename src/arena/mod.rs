//! # Paged Arena
//!
//! Fixed-size memory pages, bump-allocated per key and addressed through
//! the sorted sparse index. [`allocation`] defines the per-key window
//! metadata; [`channel`] combines index and arena into one sparse paged
//! channel of raw values.

mod allocation;
mod channel;

pub use allocation::PageAllocation;
pub use channel::{ChannelConfig, Element, SparseChannel};
