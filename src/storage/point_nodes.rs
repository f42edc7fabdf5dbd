//! # Point Node Storage
//!
//! The surface the octree pipeline stores points through: three sparse
//! paged channels (X, Y, Z) kept in lockstep, keyed by octree-node
//! Morton code.
//!
//! ## Lockstep Invariant
//!
//! All three channels are built from one [`StoreConfig`] and share one
//! [`PageBudget`], so allocation placement is deterministic and
//! identical across channels for any call sequence. Every mutation that
//! adds or extends a node's data is applied to all three channels
//! together; at every observable point they hold identical key sets in
//! identical relative order with identical lengths. Queries therefore
//! delegate to the X channel.
//!
//! ## Pre-Flight Mutation Checks
//!
//! A naive triple update would desynchronize the channels if the second
//! or third call failed. Every mutating operation here validates all of
//! its failure conditions against the shared state *before* touching any
//! channel, so a failed call leaves the store exactly as it was.
//!
//! ## Node Lifecycle
//!
//! ```text
//! Unregistered --add_node--> Empty --add_data--> Partial --...--> Full
//! ```
//!
//! `Full` rejects further appends with `CapacityExceeded`. Nothing
//! shrinks; the whole store is torn down as one unit, releasing every
//! page.

use std::sync::Arc;

use eyre::{ensure, Result};
use smallvec::SmallVec;

use crate::arena::{ChannelConfig, SparseChannel};
use crate::config::{DEFAULT_MAX_NODES, DEFAULT_NODES_PER_PAGE, DEFAULT_POINTS_PER_NODE};
use crate::error::StoreError;
use crate::memory::PageBudget;

/// Sizing for one point store; all three channels derive from it.
#[derive(Debug, Clone, Copy)]
pub struct StoreConfig {
    /// Upper bound on distinct octree nodes.
    pub max_nodes: usize,
    /// Fixed point capacity per node.
    pub points_per_node: usize,
    /// Node allocations grouped into one page.
    pub nodes_per_page: usize,
    /// Hard page bound per channel; the shared budget is three times this.
    pub max_pages: usize,
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        self.channel_config().validate()
    }

    fn channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            allocation_size: self.points_per_node,
            page_size: self.points_per_node * self.nodes_per_page,
            max_pages: self.max_pages,
            max_keys: self.max_nodes,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_nodes: DEFAULT_MAX_NODES,
            points_per_node: DEFAULT_POINTS_PER_NODE,
            nodes_per_page: DEFAULT_NODES_PER_PAGE,
            max_pages: DEFAULT_MAX_NODES.div_ceil(DEFAULT_NODES_PER_PAGE),
        }
    }
}

/// Lifecycle state of one node's allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// No allocation exists for the code.
    Unregistered,
    /// Registered, nothing appended yet.
    Empty,
    /// Some points appended, room remains.
    Partial,
    /// Allocation filled to capacity.
    Full,
}

/// Three sparse paged channels in lockstep, keyed by Morton code.
pub struct PointNodeStorage {
    x: SparseChannel<f32>,
    y: SparseChannel<f32>,
    z: SparseChannel<f32>,
    budget: Arc<PageBudget>,
    points_per_node: usize,
}

impl PointNodeStorage {
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let channel_config = config.channel_config();
        let budget = Arc::new(PageBudget::with_limit(config.max_pages * 3));

        Ok(Self {
            x: SparseChannel::with_budget(channel_config, Arc::clone(&budget))?,
            y: SparseChannel::with_budget(channel_config, Arc::clone(&budget))?,
            z: SparseChannel::with_budget(channel_config, Arc::clone(&budget))?,
            budget,
            points_per_node: config.points_per_node,
        })
    }

    pub fn contains_node(&self, code: u64) -> bool {
        self.x.contains(code)
    }

    pub fn len(&self, code: u64) -> Result<usize> {
        self.x.len(code)
    }

    pub fn remaining(&self, code: u64) -> Result<usize> {
        self.x.remaining(code)
    }

    pub fn is_full(&self, code: u64) -> Result<bool> {
        self.x.is_full(code)
    }

    pub fn is_empty(&self, code: u64) -> Result<bool> {
        Ok(self.x.len(code)? == 0)
    }

    pub fn node_state(&self, code: u64) -> NodeState {
        match self.x.allocation(code) {
            Err(_) => NodeState::Unregistered,
            Ok(alloc) if alloc.is_empty() => NodeState::Empty,
            Ok(alloc) if alloc.is_full() => NodeState::Full,
            Ok(_) => NodeState::Partial,
        }
    }

    /// Register a node, reserving a `points_per_node` allocation in all
    /// three channels.
    ///
    /// Every failure condition is checked against the X channel and the
    /// shared budget before any channel mutates, so the channels can
    /// never desynchronize: after the pre-flight the three `add_key`
    /// calls are infallible.
    pub fn add_node(&mut self, code: u64) -> Result<()> {
        ensure!(
            !self.x.contains(code),
            StoreError::KeyAlreadyExists { key: code }
        );
        ensure!(
            !self.x.index_is_full(),
            StoreError::IndexFull {
                capacity: self.x.key_capacity(),
            }
        );
        if self.x.needs_new_page() {
            ensure!(
                self.budget.can_acquire(3),
                StoreError::PageBudgetExhausted {
                    requested: 3,
                    available: self.budget.available(),
                    limit: self.budget.limit(),
                }
            );
        }

        self.x.add_key(code)?;
        self.y.add_key(code)?;
        self.z.add_key(code)?;
        Ok(())
    }

    /// Append one coordinate batch to all three channels in lockstep.
    pub fn add_data(&mut self, code: u64, xs: &[f32], ys: &[f32], zs: &[f32]) -> Result<()> {
        ensure!(
            xs.len() == ys.len() && ys.len() == zs.len(),
            "coordinate batches must have equal lengths: x={} y={} z={}",
            xs.len(),
            ys.len(),
            zs.len()
        );

        // One capacity check covers all three channels by the lockstep
        // invariant; `remaining` also surfaces KeyNotFound up front.
        let remaining = self.x.remaining(code)?;
        ensure!(
            xs.len() <= remaining,
            StoreError::CapacityExceeded {
                key: code,
                requested: xs.len(),
                remaining,
            }
        );

        self.x.append(code, xs)?;
        self.y.append(code, ys)?;
        self.z.append(code, zs)?;
        Ok(())
    }

    pub fn add_point(&mut self, code: u64, x: f32, y: f32, z: f32) -> Result<()> {
        self.add_data(code, &[x], &[y], &[z])
    }

    /// De-interleave `[x0, y0, z0, x1, ...]` and append it as one batch.
    pub fn add_interleaved(&mut self, code: u64, xyz: &[f32]) -> Result<()> {
        ensure!(
            xyz.len() % 3 == 0,
            "interleaved batch length {} is not a multiple of 3",
            xyz.len()
        );

        let mut xs: SmallVec<[f32; 32]> = SmallVec::with_capacity(xyz.len() / 3);
        let mut ys: SmallVec<[f32; 32]> = SmallVec::with_capacity(xyz.len() / 3);
        let mut zs: SmallVec<[f32; 32]> = SmallVec::with_capacity(xyz.len() / 3);
        for point in xyz.chunks_exact(3) {
            xs.push(point[0]);
            ys.push(point[1]);
            zs.push(point[2]);
        }

        self.add_data(code, &xs, &ys, &zs)
    }

    /// Zero-copy views over the node's written X, Y and Z runs.
    pub fn node(&self, code: u64) -> Result<(&[f32], &[f32], &[f32])> {
        Ok((self.x.slice(code)?, self.y.slice(code)?, self.z.slice(code)?))
    }

    /// Registered Morton codes, ascending.
    pub fn codes(&self) -> impl Iterator<Item = u64> + '_ {
        self.x.keys()
    }

    pub fn node_count(&self) -> usize {
        self.x.key_count()
    }

    pub fn node_capacity(&self) -> usize {
        self.x.key_capacity()
    }

    pub fn points_per_node(&self) -> usize {
        self.points_per_node
    }

    /// Pages live across all three channels.
    pub fn page_count(&self) -> usize {
        self.x.page_count() + self.y.page_count() + self.z.page_count()
    }

    pub fn budget(&self) -> &PageBudget {
        &self.budget
    }

    #[cfg(test)]
    pub(crate) fn channel_key_counts(&self) -> (usize, usize, usize) {
        (self.x.key_count(), self.y.key_count(), self.z.key_count())
    }

    #[cfg(test)]
    pub(crate) fn channel_keys(&self) -> (Vec<u64>, Vec<u64>, Vec<u64>) {
        (
            self.x.keys().collect(),
            self.y.keys().collect(),
            self.z.keys().collect(),
        )
    }
}
