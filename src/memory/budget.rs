//! # Page Budget
//!
//! Atomic accounting of live pages against a hard limit. Every page
//! buffer the arena layer allocates is acquired from a budget first, so
//! total memory stays bounded no matter how sparse the key space is.
//!
//! ## Enforcement Model
//!
//! Hard limits: an acquisition that would exceed the budget is refused
//! with [`StoreError::PageBudgetExhausted`] before any allocation
//! happens. The core never retries or evicts; callers decide whether to
//! flush nodes out-of-core and retry.
//!
//! ## Sharing
//!
//! One budget is shared (via `Arc`) by the three coordinate channels of
//! a point store, so the X/Y/Z arenas draw from a single bound and a
//! pre-flight check can reserve room for all three before any channel
//! mutates.
//!
//! ## Auto-Detection
//!
//! `auto_detect` sizes the budget as a fraction of system RAM
//! (`DEFAULT_BUDGET_PERCENT`), floored at `MIN_PAGE_FLOOR` pages. The
//! system memory probe runs once per process.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use eyre::{bail, Result};
use sysinfo::System;

use crate::config::{DEFAULT_BUDGET_PERCENT, MIN_PAGE_FLOOR};
use crate::error::StoreError;

static SYSTEM_TOTAL_MEMORY: OnceLock<usize> = OnceLock::new();

#[derive(Debug, Clone, Copy)]
pub struct BudgetStats {
    pub limit: usize,
    pub used: usize,
}

impl BudgetStats {
    pub fn available(&self) -> usize {
        self.limit.saturating_sub(self.used)
    }

    pub fn utilization_percent(&self) -> f64 {
        if self.limit == 0 {
            return 0.0;
        }
        (self.used as f64 / self.limit as f64) * 100.0
    }
}

impl std::fmt::Display for BudgetStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pages:{}/{}", self.used, self.limit)
    }
}

/// Hard upper bound on live pages, tracked with a lock-free counter.
#[derive(Debug)]
pub struct PageBudget {
    limit: usize,
    used: AtomicUsize,
}

impl PageBudget {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            used: AtomicUsize::new(0),
        }
    }

    /// Size the budget from system RAM: `DEFAULT_BUDGET_PERCENT` of total
    /// memory divided by `page_bytes`, floored at `MIN_PAGE_FLOOR`.
    pub fn auto_detect(page_bytes: usize) -> Self {
        let total_memory = *SYSTEM_TOTAL_MEMORY.get_or_init(|| {
            let mut sys = System::new();
            sys.refresh_memory();
            sys.total_memory() as usize
        });

        let budget_bytes = (total_memory * DEFAULT_BUDGET_PERCENT) / 100;
        let pages = (budget_bytes / page_bytes.max(1)).max(MIN_PAGE_FLOOR);

        Self::with_limit(pages)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn used(&self) -> usize {
        self.used.load(Ordering::Acquire)
    }

    pub fn available(&self) -> usize {
        self.limit.saturating_sub(self.used())
    }

    pub fn can_acquire(&self, pages: usize) -> bool {
        self.available() >= pages
    }

    /// Reserve `pages` pages, failing if the limit would be exceeded.
    pub fn acquire(&self, pages: usize) -> Result<()> {
        if pages == 0 {
            return Ok(());
        }

        loop {
            let current = self.used.load(Ordering::Acquire);
            let next = current + pages;

            if next > self.limit {
                bail!(StoreError::PageBudgetExhausted {
                    requested: pages,
                    available: self.limit.saturating_sub(current),
                    limit: self.limit,
                });
            }

            match self.used.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(()),
                Err(_) => continue,
            }
        }
    }

    /// Return `pages` pages to the budget. Saturates at zero.
    pub fn release(&self, pages: usize) {
        if pages == 0 {
            return;
        }

        loop {
            let current = self.used.load(Ordering::Acquire);
            let next = current.saturating_sub(pages);

            match self.used.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return,
                Err(_) => continue,
            }
        }
    }

    pub fn stats(&self) -> BudgetStats {
        BudgetStats {
            limit: self.limit,
            used: self.used(),
        }
    }
}
