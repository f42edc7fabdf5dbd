//! # mortonstore - Out-of-Core Point-Cloud Octree Storage
//!
//! `mortonstore` is the storage substrate beneath an out-of-core
//! point-cloud octree. Octree nodes are addressed by Morton (Z-order)
//! codes derived from quantized 3D integer coordinates; an effectively
//! unbounded, sparse key space (up to 2^64 node codes) is backed by a
//! small, bounded set of fixed-size memory pages. The design
//! prioritizes:
//!
//! - **Bounded memory**: every page is acquired from a hard budget;
//!   total memory never depends on how sparse the key space is
//! - **Zero-copy reads**: node data is returned as borrowed slices into
//!   page memory, never copied out
//! - **Zero per-key allocation**: keys receive fixed-capacity windows
//!   inside shared pages via a greedy bump allocator
//!
//! ## Quick Start
//!
//! ```ignore
//! use mortonstore::{morton, PointNodeStorage, StoreConfig};
//!
//! let mut store = PointNodeStorage::new(StoreConfig::default())?;
//!
//! let code = morton::encode64(cell.0, cell.1, cell.2)?;
//! if !store.contains_node(code) {
//!     store.add_node(code)?;
//! }
//! store.add_data(code, &xs, &ys, &zs)?;
//!
//! let (x, y, z) = store.node(code)?; // borrowed views into page memory
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │   Shared Handle (dispose, scoped access) │
//! ├─────────────────────────────────────────┤
//! │   Point Node Storage (XYZ lockstep)      │
//! ├─────────────────────────────────────────┤
//! │   Sparse Paged Channel (per coordinate)  │
//! ├──────────────────┬──────────────────────┤
//! │ Sorted Sparse    │  Paged Bump Arena    │
//! │ Index (key→slot) │  (fixed-size pages)  │
//! ├──────────────────┴──────────────────────┤
//! │   Page Budget (atomic accounting)        │
//! └─────────────────────────────────────────┘
//!        Morton Codec (pure, stateless)
//! ```
//!
//! ## Module Overview
//!
//! - [`morton`]: bit-interleaving codec between 3D coordinates and
//!   Z-order codes
//! - [`index`]: sorted sparse index mapping Morton keys to dense slots
//! - [`arena`]: paged bump-allocated arena and the sparse paged channel
//! - [`memory`]: page budget accounting
//! - [`storage`]: the XYZ point-storage surface and shared handle
//! - [`config`]: centralized sizing constants
//! - [`error`]: typed error kinds, raised through `eyre`
//!
//! ## What This Is Not
//!
//! Not a general-purpose database: no on-disk persistence, no wire
//! serialization, no page compaction or per-key reclamation. A key's
//! allocation lives until the whole store is torn down.

pub mod arena;
pub mod config;
pub mod error;
pub mod index;
pub mod memory;
pub mod morton;
pub mod storage;

pub use arena::{ChannelConfig, Element, PageAllocation, SparseChannel};
pub use error::StoreError;
pub use index::{SearchResult, SortedSparseIndex};
pub use memory::{BudgetStats, PageBudget};
pub use storage::{NodeState, PointNodeStorage, SharedPointStore, StoreConfig};
