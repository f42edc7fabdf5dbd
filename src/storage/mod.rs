//! # Point Storage Surface
//!
//! The public point-storage surface keyed by octree-node Morton code:
//! [`point_nodes`] holds the three-channel XYZ store; [`shared`] wraps
//! it in a cloneable, dispose-aware handle for multi-task pipelines.

mod point_nodes;
mod shared;

pub use point_nodes::{NodeState, PointNodeStorage, StoreConfig};
pub use shared::SharedPointStore;
