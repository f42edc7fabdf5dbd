//! # Shared Store Handle
//!
//! A cloneable handle over a [`PointNodeStorage`] for pipelines where
//! several tasks populate different nodes and a coordinator tears the
//! store down at the end.
//!
//! ## Scoped Access
//!
//! All access goes through closures ([`read`](SharedPointStore::read) /
//! [`write`](SharedPointStore::write)), so borrowed page views cannot
//! escape the lock guard. Teardown therefore never races a borrow: by
//! the time [`dispose`](SharedPointStore::dispose) acquires the write
//! lock, no view into page memory exists anywhere.
//!
//! ## Disposal
//!
//! `dispose` takes the storage out of the handle and drops it, releasing
//! every page in one teardown. Every subsequent operation through any
//! clone of the handle, including a second `dispose`, fails with
//! [`StoreError::UseAfterDispose`]. Callers holding work in flight chain
//! their tasks before calling `dispose`; the handle itself is the
//! deferred-release primitive.
//!
//! ## Concurrency Model
//!
//! The `RwLock` serializes index mutations (one writer) and shares
//! lookups (many readers), matching the single-writer discipline the
//! core requires. Operations are synchronous and non-suspending; there
//! is no cancellation at this layer - callers cancel by not issuing
//! further calls.

use std::sync::Arc;

use eyre::{bail, Result};
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::storage::{NodeState, PointNodeStorage, StoreConfig};

/// Cloneable, dispose-aware handle to a point store.
#[derive(Clone)]
pub struct SharedPointStore {
    inner: Arc<RwLock<Option<PointNodeStorage>>>,
}

impl SharedPointStore {
    pub fn new(storage: PointNodeStorage) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(storage))),
        }
    }

    pub fn with_config(config: StoreConfig) -> Result<Self> {
        Ok(Self::new(PointNodeStorage::new(config)?))
    }

    /// Run `f` with shared read access to the live store.
    pub fn read<R>(&self, f: impl FnOnce(&PointNodeStorage) -> R) -> Result<R> {
        let guard = self.inner.read();
        match guard.as_ref() {
            Some(storage) => Ok(f(storage)),
            None => bail!(StoreError::UseAfterDispose),
        }
    }

    /// Run `f` with exclusive access to the live store.
    pub fn write<R>(&self, f: impl FnOnce(&mut PointNodeStorage) -> Result<R>) -> Result<R> {
        let mut guard = self.inner.write();
        match guard.as_mut() {
            Some(storage) => f(storage),
            None => bail!(StoreError::UseAfterDispose),
        }
    }

    pub fn contains_node(&self, code: u64) -> Result<bool> {
        self.read(|storage| storage.contains_node(code))
    }

    pub fn len(&self, code: u64) -> Result<usize> {
        self.read(|storage| storage.len(code))?
    }

    pub fn is_full(&self, code: u64) -> Result<bool> {
        self.read(|storage| storage.is_full(code))?
    }

    pub fn node_state(&self, code: u64) -> Result<NodeState> {
        self.read(|storage| storage.node_state(code))
    }

    pub fn node_count(&self) -> Result<usize> {
        self.read(|storage| storage.node_count())
    }

    pub fn add_node(&self, code: u64) -> Result<()> {
        self.write(|storage| storage.add_node(code))
    }

    pub fn add_point(&self, code: u64, x: f32, y: f32, z: f32) -> Result<()> {
        self.write(|storage| storage.add_point(code, x, y, z))
    }

    pub fn add_data(&self, code: u64, xs: &[f32], ys: &[f32], zs: &[f32]) -> Result<()> {
        self.write(|storage| storage.add_data(code, xs, ys, zs))
    }

    /// Run `f` over the node's X/Y/Z views without copying them out.
    pub fn with_node<R>(&self, code: u64, f: impl FnOnce(&[f32], &[f32], &[f32]) -> R) -> Result<R> {
        let guard = self.inner.read();
        match guard.as_ref() {
            Some(storage) => {
                let (x, y, z) = storage.node(code)?;
                Ok(f(x, y, z))
            }
            None => bail!(StoreError::UseAfterDispose),
        }
    }

    /// Tear the store down, releasing every page.
    pub fn dispose(&self) -> Result<()> {
        let mut guard = self.inner.write();
        match guard.take() {
            Some(_storage) => Ok(()),
            None => bail!(StoreError::UseAfterDispose),
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.read().is_none()
    }
}
