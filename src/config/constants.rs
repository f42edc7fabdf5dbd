//! # Storage Configuration Constants
//!
//! This module centralizes the default sizing constants for the point
//! storage core. Constants that depend on each other are co-located to
//! prevent mismatch bugs.
//!
//! ## Dependency Graph
//!
//! ```text
//! DEFAULT_POINTS_PER_NODE (65536)
//!       │
//!       └─> DEFAULT_PAGE_POINTS (derived: POINTS_PER_NODE * NODES_PER_PAGE)
//!             Each page holds DEFAULT_NODES_PER_PAGE fixed-capacity
//!             allocations. A page must be an exact multiple of the
//!             allocation size; channel construction validates this.
//!
//! DEFAULT_BUDGET_PERCENT (25)
//!       │
//!       └─> PageBudget::auto_detect sizes the page budget as this
//!           fraction of system RAM, floored at MIN_PAGE_FLOOR pages.
//! ```
//!
//! ## Critical Invariants
//!
//! Enforced by compile-time assertions:
//!
//! 1. `DEFAULT_PAGE_POINTS == DEFAULT_POINTS_PER_NODE * DEFAULT_NODES_PER_PAGE`
//! 2. `DEFAULT_NODES_PER_PAGE >= 1` (a page holds at least one allocation)
//!
//! ## Usage
//!
//! Import constants from this module rather than defining them locally:
//!
//! ```ignore
//! use crate::config::{DEFAULT_POINTS_PER_NODE, DEFAULT_NODES_PER_PAGE};
//! ```

/// Default fixed point capacity granted to each octree node.
/// Per-node point budgets are known upfront in the octree build pipeline,
/// so allocations never resize.
pub const DEFAULT_POINTS_PER_NODE: usize = 65_536;

/// Default number of node allocations grouped into one page.
/// Larger values amortize page allocation overhead across more nodes at
/// the cost of coarser budget granularity.
pub const DEFAULT_NODES_PER_PAGE: usize = 16;

/// Default number of values in one page.
/// Derived; must stay an exact multiple of DEFAULT_POINTS_PER_NODE.
pub const DEFAULT_PAGE_POINTS: usize = DEFAULT_POINTS_PER_NODE * DEFAULT_NODES_PER_PAGE;

/// Default upper bound on the number of octree nodes in one store.
pub const DEFAULT_MAX_NODES: usize = 100_000;

/// Fraction of system RAM used by `PageBudget::auto_detect`.
pub const DEFAULT_BUDGET_PERCENT: usize = 25;

/// Minimum page budget regardless of detected system memory.
pub const MIN_PAGE_FLOOR: usize = 4;

const _: () = assert!(
    DEFAULT_PAGE_POINTS == DEFAULT_POINTS_PER_NODE * DEFAULT_NODES_PER_PAGE,
    "DEFAULT_PAGE_POINTS must be derived from DEFAULT_POINTS_PER_NODE"
);

const _: () = assert!(
    DEFAULT_NODES_PER_PAGE >= 1,
    "a page must hold at least one allocation"
);
