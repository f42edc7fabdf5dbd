//! # Memory Accounting
//!
//! Page-granular budget enforcement for the arena layer. See [`budget`]
//! for the enforcement model and sharing across channels.

mod budget;

pub use budget::{BudgetStats, PageBudget};
