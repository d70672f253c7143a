//! # rstar-disk - a disk-backed R*-tree
//!
//! This crate provides an R*-tree over `d`-dimensional points whose nodes
//! and point records are persisted to files under application control.
//!
//! ## Features
//!
//! - **Disk-Based Storage**: one file per node, points in an append-only store
//! - **Lazy Loading**: nodes are read on first access and stay resident
//! - **Write-Through**: every insert and remove is on disk when it returns
//! - **R\* Splits**: least-margin axis, least-overlap distribution
//! - **Queries**: lazy region search, k nearest neighbours
//! - **Integrity Checks**: checksummed node records and a structural walk
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rstar_disk::{HyperRectangle, RStarTree, SpatialPoint, TreeConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TreeConfig::new("/tmp/places", 2).with_capacity(32);
//! let mut tree = RStarTree::create(config)?;
//!
//! tree.insert(SpatialPoint::from([1.0, 1.0]))?;
//! tree.insert(SpatialPoint::from([5.0, 5.0]))?;
//!
//! let region = HyperRectangle::from_bounds(vec![0.0, 0.0], vec![2.0, 2.0])?;
//! for point in tree.search(&region)? {
//!     println!("{}", point?);
//! }
//!
//! let nearest = tree.nearest(&SpatialPoint::from([4.0, 4.0]), 1)?;
//! assert_eq!(nearest[0].0, SpatialPoint::from([5.0, 5.0]));
//!
//! tree.close()?;
//! # Ok(())
//! # }
//! ```

pub mod disk_rtree;
pub mod geometry;

// Re-export R*-tree types
pub use disk_rtree::{
    IntegrityReport, RStarTree, RTreeStats, SaveStatus, Search, SpatialError, SpatialResult,
    StorageManager, TreeConfig, TreeSnapshot,
};

// Re-export geometry types
pub use geometry::{HyperRectangle, SpatialPoint};
