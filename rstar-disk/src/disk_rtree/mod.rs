//! Disk-based R*-tree implementation.
//!
//! This module provides an R*-tree whose nodes and points live on disk:
//! - One file per node, rewritten in full on every save
//! - An append-only point store addressed by byte offset
//! - Lazy loading of nodes on demand (never loads all data at once)
//! - R* split heuristics (least margin axis, least overlap distribution)
//!
//! Loaded nodes stay resident in an arena keyed by node id for the rest of
//! the session.

pub mod integrity;
pub mod rtree_arena;
pub mod rtree_config;
pub mod rtree_constants;
pub mod rtree_node;
pub mod rtree_split;
pub mod rtree_storage;
pub mod rtree_types;
mod rtree_impl;

pub use integrity::IntegrityReport;
pub use rtree_arena::NodeArena;
pub use rtree_config::TreeConfig;
pub use rtree_constants::{DEFAULT_CAPACITY, DEFAULT_MIN_FILL};
pub use rtree_impl::{RStarTree, Search};
pub use rtree_node::{ChildRef, InternalNode, LeafNode, Node};
pub use rtree_split::split;
pub use rtree_storage::StorageManager;
pub use rtree_types::{
    NodeId, NodeKind, NodePage, NodeRecord, Overflow, PointOffset, PointRecord, RTreeStats,
    SaveStatus, SpatialError, SpatialResult, TreeSnapshot,
};
