//! # Storage Error Kinds
//!
//! This module defines the typed error kinds raised by the storage core.
//! All errors are local, synchronous, and caller-recoverable; the core
//! never retries internally.
//!
//! ## Error Categories
//!
//! Routine, checked conditions that callers may treat as control flow:
//!
//! - `KeyNotFound` - lookup for a key that was never added
//! - `KeyAlreadyExists` - duplicate insertion into a sparse index
//! - `IndexFull` - sparse index at its fixed capacity
//! - `PageBudgetExhausted` - no pages left under the configured budget
//! - `CapacityExceeded` - append would overflow a key's fixed allocation
//!
//! Programmer-error class conditions:
//!
//! - `Overflow` - coordinate exceeds the codec's per-component bit budget
//! - `UseAfterDispose` - operation on a disposed shared store
//!
//! ## Propagation
//!
//! Fallible operations return `eyre::Result` and raise these kinds via
//! `bail!` / `ensure!`. Callers that branch on the kind (for example,
//! checking `contains_node` races or treating `KeyAlreadyExists` as a
//! no-op) downcast the report:
//!
//! ```ignore
//! match index.add(key, alloc) {
//!     Ok(()) => {}
//!     Err(e) => match e.downcast_ref::<StoreError>() {
//!         Some(StoreError::KeyAlreadyExists { .. }) => {}
//!         _ => return Err(e),
//!     },
//! }
//! ```

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A coordinate component exceeds the codec's bit budget.
    Overflow {
        component: &'static str,
        value: u32,
        max: u32,
    },
    /// The key is not present in the sparse index.
    KeyNotFound { key: u64 },
    /// The key is already present in the sparse index.
    KeyAlreadyExists { key: u64 },
    /// The sparse index holds `capacity` entries and cannot grow.
    IndexFull { capacity: usize },
    /// Acquiring `requested` pages would exceed the page budget.
    PageBudgetExhausted {
        requested: usize,
        available: usize,
        limit: usize,
    },
    /// Appending `requested` values would overflow the key's allocation.
    CapacityExceeded {
        key: u64,
        requested: usize,
        remaining: usize,
    },
    /// The shared store was disposed before this operation.
    UseAfterDispose,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Overflow {
                component,
                value,
                max,
            } => write!(
                f,
                "coordinate component {} = {} exceeds codec bound {}",
                component, value, max
            ),
            StoreError::KeyNotFound { key } => write!(f, "key {:#x} not found", key),
            StoreError::KeyAlreadyExists { key } => {
                write!(f, "key {:#x} already exists", key)
            }
            StoreError::IndexFull { capacity } => {
                write!(f, "sparse index full at capacity {}", capacity)
            }
            StoreError::PageBudgetExhausted {
                requested,
                available,
                limit,
            } => write!(
                f,
                "page budget exhausted: requested {} page(s) but only {} of {} available",
                requested, available, limit
            ),
            StoreError::CapacityExceeded {
                key,
                requested,
                remaining,
            } => write!(
                f,
                "allocation for key {:#x} cannot take {} value(s), {} remaining",
                key, requested, remaining
            ),
            StoreError::UseAfterDispose => write!(f, "store used after dispose"),
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = StoreError::CapacityExceeded {
            key: 0x2a,
            requested: 5,
            remaining: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("0x2a"));
        assert!(msg.contains('5'));
        assert!(msg.contains('2'));
    }

    #[test]
    fn downcast_through_eyre() {
        let report: eyre::Report = StoreError::KeyNotFound { key: 7 }.into();
        assert_eq!(
            report.downcast_ref::<StoreError>(),
            Some(&StoreError::KeyNotFound { key: 7 })
        );
    }
}
