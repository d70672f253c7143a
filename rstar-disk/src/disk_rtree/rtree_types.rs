//! Core types and data structures for the disk-based R*-tree.
//!
//! This module defines the fundamental types used throughout the tree:
//! - Error types and result types
//! - Identifiers and statistics
//! - On-disk record shapes for points, nodes and tree snapshots

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rtree_config::TreeConfig;
use super::rtree_constants::{MAGIC, VERSION};
use crate::geometry::{HyperRectangle, SpatialPoint};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur in spatial indexing operations
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for spatial operations
pub type SpatialResult<T> = Result<T, SpatialError>;

/// Returned by a node insert when the node is already at capacity.
///
/// Carries the rejected item back so the caller can split the node with it.
#[derive(Debug, Error)]
#[error("node is at capacity")]
pub struct Overflow<T>(pub T);

/// Outcome of a whole-tree snapshot save.
///
/// An unwritable destination is an expected condition, so it is reported
/// as a status rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    DestinationUnwritable,
}

impl SaveStatus {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveStatus::Saved)
    }
}

/// Node id - process-unique, stable identifier of a node and its file
pub type NodeId = u64;

/// Byte offset of a point record in the point store
pub type PointOffset = u64;

// ============================================================================
// Statistics
// ============================================================================

/// Statistics about R*-tree operations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RTreeStats {
    pub total_entries: u64,
    pub resident_nodes: u64,
    pub node_loads: u64,
    pub node_writes: u64,
    pub point_writes: u64,
    pub splits: u64,
    pub tree_height: u32,
}

// ============================================================================
// Records
// ============================================================================

/// On-disk shape of a point: its coordinate vector, length-prefixed so the
/// dimension can be recovered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub coords: Vec<f64>,
}

impl From<&SpatialPoint> for PointRecord {
    fn from(point: &SpatialPoint) -> Self {
        PointRecord {
            coords: point.coords().to_vec(),
        }
    }
}

impl From<PointRecord> for SpatialPoint {
    fn from(record: PointRecord) -> Self {
        SpatialPoint::new(record.coords)
    }
}

/// Leaf/internal flag of a node record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Leaf,
    Internal,
}

/// On-disk shape of a node.
///
/// For a leaf, `children` holds point offsets and `child_mbrs` is empty.
/// For an internal node, `children` holds child node ids and `child_mbrs`
/// the matching child bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub kind: NodeKind,
    pub dimension: u32,
    pub mbr: HyperRectangle,
    pub children: Vec<u64>,
    pub child_mbrs: Vec<HyperRectangle>,
}

impl NodeRecord {
    /// Checks that the record has the shape its flag claims.
    pub fn validate(&self, dimension: usize) -> SpatialResult<()> {
        if self.dimension as usize != dimension || self.mbr.dimension() != dimension {
            return Err(SpatialError::CorruptRecord(format!(
                "node record dimension {} does not match store dimension {}",
                self.dimension, dimension
            )));
        }
        match self.kind {
            NodeKind::Leaf if !self.child_mbrs.is_empty() => Err(SpatialError::CorruptRecord(
                "leaf record carries child bounds".into(),
            )),
            NodeKind::Internal if self.child_mbrs.len() != self.children.len() => {
                Err(SpatialError::CorruptRecord(format!(
                    "internal record has {} children but {} child bounds",
                    self.children.len(),
                    self.child_mbrs.len()
                )))
            }
            NodeKind::Internal if self.children.is_empty() => Err(SpatialError::CorruptRecord(
                "internal record has no children".into(),
            )),
            _ => {
                if self.child_mbrs.iter().any(|m| m.dimension() != dimension) {
                    return Err(SpatialError::CorruptRecord(
                        "child bounds have the wrong dimension".into(),
                    ));
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// Page with Checksum
// ============================================================================

/// A node record wrapped with a CRC32 checksum for corruption detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodePage {
    pub version: u32,
    /// CRC32 checksum of the encoded record
    pub checksum: u32,
    pub record: NodeRecord,
}

impl NodePage {
    pub fn new(record: NodeRecord) -> SpatialResult<Self> {
        let checksum = Self::calculate_checksum(&record)?;
        Ok(Self {
            version: VERSION,
            checksum,
            record,
        })
    }

    /// Calculate CRC32 checksum of record data
    pub fn calculate_checksum(record: &NodeRecord) -> SpatialResult<u32> {
        let serialized = bincode::serde::encode_to_vec(record, bincode::config::legacy())
            .map_err(|e| SpatialError::Serialization(e.to_string()))?;
        Ok(Self::crc32(&serialized))
    }

    /// CRC32-MPEG2
    fn crc32(data: &[u8]) -> u32 {
        let mut crc: u32 = 0xFFFFFFFF;
        const POLY: u32 = 0x04C11DB7;

        for &byte in data {
            crc ^= (byte as u32) << 24;
            for _ in 0..8 {
                crc = if crc & 0x80000000 != 0 {
                    (crc << 1) ^ POLY
                } else {
                    crc << 1
                };
            }
        }

        crc ^ 0xFFFFFFFF
    }

    /// Verify version and checksum and consume self to return the record
    pub fn into_record(self) -> SpatialResult<NodeRecord> {
        if self.version != VERSION {
            return Err(SpatialError::CorruptRecord(format!(
                "unsupported node record version {}",
                self.version
            )));
        }
        let expected = Self::calculate_checksum(&self.record)?;
        if self.checksum != expected {
            return Err(SpatialError::CorruptRecord(format!(
                "node checksum mismatch (expected: {:x}, got: {:x})",
                expected, self.checksum
            )));
        }
        Ok(self.record)
    }
}

// ============================================================================
// Tree Snapshot
// ============================================================================

/// Whole-tree snapshot: everything needed to reattach a tree to its node
/// store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub magic: u32,
    pub version: u32,
    pub root_id: NodeId,
    pub dimension: u32,
    pub capacity: u32,
    pub min_fill: f64,
    pub next_node_id: NodeId,
    pub entry_count: u64,
    pub height: u32,
}

impl TreeSnapshot {
    pub fn validate(&self) -> SpatialResult<()> {
        if self.magic != MAGIC {
            return Err(SpatialError::CorruptRecord(
                "invalid snapshot format (bad magic)".into(),
            ));
        }
        if self.version != VERSION {
            return Err(SpatialError::CorruptRecord(format!(
                "unsupported snapshot version {}",
                self.version
            )));
        }
        if self.root_id >= self.next_node_id {
            return Err(SpatialError::CorruptRecord(format!(
                "root id {} was never allocated (next id {})",
                self.root_id, self.next_node_id
            )));
        }
        Ok(())
    }

    /// Checks that a snapshot belongs to a tree built with `config`.
    /// Dimension, capacity and minimum fill must all match.
    pub fn check_config(&self, config: &TreeConfig) -> SpatialResult<()> {
        if self.dimension as usize != config.dimension
            || self.capacity as usize != config.capacity
        {
            return Err(SpatialError::InvalidConfig(format!(
                "snapshot was written with dimension {} and capacity {}, configured {} and {}",
                self.dimension, self.capacity, config.dimension, config.capacity
            )));
        }
        if self.min_fill.to_bits() != config.min_fill.to_bits() {
            return Err(SpatialError::InvalidConfig(format!(
                "snapshot was written with min fill {}, configured {}",
                self.min_fill, config.min_fill
            )));
        }
        Ok(())
    }
}
