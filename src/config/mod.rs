//! # Configuration
//!
//! Centralized sizing constants for the storage core. See
//! [`constants`] for the dependency notes between values.

mod constants;

pub use constants::{
    DEFAULT_BUDGET_PERCENT, DEFAULT_MAX_NODES, DEFAULT_NODES_PER_PAGE, DEFAULT_PAGE_POINTS,
    DEFAULT_POINTS_PER_NODE, MIN_PAGE_FLOOR,
};
