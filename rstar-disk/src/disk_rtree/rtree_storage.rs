//! Disk storage layer for the R*-tree.
//!
//! Two stores live under the configured directory:
//! - the point store, a single append-only file of point records addressed
//!   by byte offset
//! - the node store, one file per node named `prefix + id + suffix`, fully
//!   overwritten on every save
//!
//! Node records and snapshots are never rewritten in place. The new bytes go
//! to a temporary file next to the target (a [`StagedWrite`]) and are
//! renamed over it on commit, so a failed write leaves the previous record.
//!
//! Each `load` call reads exactly one node file (plus the point records of a
//! leaf). There is no bulk loading and no retry: an I/O failure aborts the
//! operation and is returned to the caller.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::rtree_config::TreeConfig;
use super::rtree_node::{ChildRef, InternalNode, LeafNode, Node};
use super::rtree_types::{
    NodeId, NodeKind, NodePage, PointOffset, PointRecord, SaveStatus, SpatialError,
    SpatialResult, TreeSnapshot,
};
use crate::geometry::SpatialPoint;

/// I/O counters, shared by every store operation
#[derive(Debug, Default)]
struct StorageStatistics {
    node_loads: AtomicU64,
    node_writes: AtomicU64,
    point_loads: AtomicU64,
    point_writes: AtomicU64,
}

/// A record written beside its target file and not yet visible under the
/// target's name. Dropping it uncommitted removes the temporary file.
pub(crate) struct StagedWrite {
    temp: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedWrite {
    fn write(target: PathBuf, bytes: &[u8], sync: bool) -> SpatialResult<Self> {
        let temp = temp_path(&target);
        let mut file = File::create(&temp)?;
        let staged = StagedWrite {
            temp,
            target,
            committed: false,
        };
        file.write_all(bytes)?;
        if sync {
            file.sync_data()?;
        }
        Ok(staged)
    }

    /// Moves the record into place, replacing the previous one.
    pub(crate) fn commit(mut self) -> SpatialResult<()> {
        fs::rename(&self.temp, &self.target)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedWrite {
    fn drop(&mut self) {
        if !self.committed {
            if let Err(e) = fs::remove_file(&self.temp) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Failed to remove staged file {:?}: {}", self.temp, e);
                }
            }
        }
    }
}

fn temp_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    target.with_file_name(name)
}

/// Persists and retrieves nodes and points.
///
/// The point store handle is opened at construction and released when the
/// manager is dropped. Node files are opened per operation and closed
/// before the call returns, on error paths too.
pub struct StorageManager {
    config: TreeConfig,
    data_file: Mutex<File>,
    /// Encoded size of one point record of the configured dimension
    point_record_len: usize,
    stats: StorageStatistics,
}

impl StorageManager {
    /// Create fresh stores: the directory is created if needed, the point
    /// store is truncated and node files left by an earlier tree are removed.
    pub fn create(config: &TreeConfig) -> SpatialResult<Self> {
        config.validate()?;
        fs::create_dir_all(&config.directory)?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(config.data_path())?;

        let storage = Self::with_file(config, file)?;
        let stale = storage.node_ids_on_disk()?;
        if !stale.is_empty() {
            log::debug!(
                "Removing {} stale node files from {:?}",
                stale.len(),
                config.directory
            );
            for node_id in stale {
                storage.delete_node(node_id)?;
            }
        }
        Ok(storage)
    }

    /// Open existing stores
    pub fn open(config: &TreeConfig) -> SpatialResult<Self> {
        config.validate()?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(config.data_path())?;
        Self::with_file(config, file)
    }

    fn with_file(config: &TreeConfig, file: File) -> SpatialResult<Self> {
        let sample = PointRecord {
            coords: vec![0.0; config.dimension],
        };
        let point_record_len = bincode::serde::encode_to_vec(&sample, bincode::config::legacy())
            .map_err(|e| SpatialError::Serialization(e.to_string()))?
            .len();

        Ok(Self {
            config: config.clone(),
            data_file: Mutex::new(file),
            point_record_len,
            stats: StorageStatistics::default(),
        })
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Point store
    // ------------------------------------------------------------------------

    /// Appends `point` to the point store and returns the offset it was
    /// written at. That offset is the point's permanent address.
    pub fn save_point(&self, point: &SpatialPoint) -> SpatialResult<PointOffset> {
        if point.dimension() != self.config.dimension {
            return Err(SpatialError::InvalidOperation(format!(
                "point has dimension {}, store expects {}",
                point.dimension(),
                self.config.dimension
            )));
        }
        let bytes = bincode::serde::encode_to_vec(PointRecord::from(point), bincode::config::legacy())
            .map_err(|e| SpatialError::Serialization(e.to_string()))?;

        let mut file = self.data_file.lock();
        let offset = file.seek(SeekFrom::End(0))?;
        file.write_all(&bytes)?;
        if self.config.sync_writes {
            file.sync_data()?;
        }
        self.stats.point_writes.fetch_add(1, Ordering::Relaxed);
        Ok(offset)
    }

    /// Reads one point record at `offset`. The offset is trusted; a bogus
    /// one yields an I/O error or a corrupt record.
    pub fn load_point(&self, offset: PointOffset) -> SpatialResult<SpatialPoint> {
        let mut buffer = vec![0u8; self.point_record_len];
        {
            let mut file = self.data_file.lock();
            file.seek(SeekFrom::Start(offset))?;
            file.read_exact(&mut buffer)?;
        }

        let record: PointRecord =
            bincode::serde::decode_from_slice(&buffer, bincode::config::legacy())
                .map(|(record, _)| record)
                .map_err(|e| {
                    SpatialError::CorruptRecord(format!("point at offset {}: {}", offset, e))
                })?;
        if record.coords.len() != self.config.dimension {
            return Err(SpatialError::CorruptRecord(format!(
                "point at offset {} has dimension {}, store expects {}",
                offset,
                record.coords.len(),
                self.config.dimension
            )));
        }
        self.stats.point_loads.fetch_add(1, Ordering::Relaxed);
        Ok(record.into())
    }

    /// Current length of the point store in bytes
    pub fn data_len(&self) -> SpatialResult<u64> {
        Ok(self.data_file.lock().metadata()?.len())
    }

    // ------------------------------------------------------------------------
    // Node store
    // ------------------------------------------------------------------------

    /// Persists `node`, replacing its previous record.
    ///
    /// Unsaved points of a leaf are appended to the point store first and
    /// their offsets recorded in the leaf. If any write fails the previous
    /// node record stays in place; appended point records are kept.
    pub fn save(&self, node: &mut Node) -> SpatialResult<()> {
        let staged = self.stage(node)?;
        self.commit(staged)
    }

    /// Writes the record of `node` to a temporary file without replacing
    /// the current one. See [`save`](Self::save) for the point handling.
    pub(crate) fn stage(&self, node: &mut Node) -> SpatialResult<StagedWrite> {
        if let Node::Leaf(leaf) = node {
            while let Some(index) = leaf.first_unsaved_index() {
                let offset = self.save_point(&leaf.points()[index])?;
                leaf.record_offset(offset);
            }
        }

        let page = NodePage::new(node.to_record())?;
        let bytes = bincode::serde::encode_to_vec(&page, bincode::config::legacy())
            .map_err(|e| SpatialError::Serialization(e.to_string()))?;

        StagedWrite::write(self.node_path(node.id()), &bytes, self.config.sync_writes)
    }

    /// Moves a staged node record into place.
    pub(crate) fn commit(&self, staged: StagedWrite) -> SpatialResult<()> {
        staged.commit()?;
        self.stats.node_writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Reads the record of `node_id` and rebuilds the node. A leaf gets its
    /// points back from the point store; its MBR comes from the record.
    pub fn load(&self, node_id: NodeId) -> SpatialResult<Node> {
        let bytes = fs::read(self.node_path(node_id))?;
        let page: NodePage = bincode::serde::decode_from_slice(&bytes, bincode::config::legacy())
            .map(|(page, _)| page)
            .map_err(|e| SpatialError::CorruptRecord(format!("node {}: {}", node_id, e)))?;
        let record = page.into_record()?;
        record.validate(self.config.dimension)?;

        if record.children.len() > self.config.capacity {
            return Err(SpatialError::CorruptRecord(format!(
                "node {} holds {} entries, capacity is {}",
                node_id,
                record.children.len(),
                self.config.capacity
            )));
        }

        let node = match record.kind {
            NodeKind::Leaf => {
                let points = record
                    .children
                    .iter()
                    .map(|&offset| self.load_point(offset))
                    .collect::<SpatialResult<Vec<_>>>()?;
                Node::Leaf(LeafNode::from_parts(
                    node_id,
                    self.config.capacity,
                    record.mbr,
                    points,
                    record.children,
                ))
            }
            NodeKind::Internal => {
                let children = record
                    .children
                    .into_iter()
                    .zip(record.child_mbrs)
                    .map(|(child_id, mbr)| ChildRef {
                        node_id: child_id,
                        mbr,
                    })
                    .collect();
                Node::Internal(InternalNode::from_children(
                    node_id,
                    self.config.dimension,
                    self.config.capacity,
                    children,
                ))
            }
        };

        self.stats.node_loads.fetch_add(1, Ordering::Relaxed);
        Ok(node)
    }

    /// Removes the record of a node that is no longer part of the tree
    pub fn delete_node(&self, node_id: NodeId) -> SpatialResult<()> {
        match fs::remove_file(self.node_path(node_id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// File holding the record of `node_id`
    pub fn node_path(&self, node_id: NodeId) -> PathBuf {
        self.config.directory.join(format!(
            "{}{}{}",
            self.config.node_file_prefix, node_id, self.config.node_file_suffix
        ))
    }

    /// Exact inverse of [`node_path`](Self::node_path).
    pub fn node_id_from_path(&self, path: &Path) -> SpatialResult<NodeId> {
        let invalid = || {
            SpatialError::InvalidOperation(format!("{:?} is not a node file name", path))
        };
        let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(invalid)?;
        let digits = name
            .strip_prefix(self.config.node_file_prefix.as_str())
            .and_then(|rest| rest.strip_suffix(self.config.node_file_suffix.as_str()))
            .ok_or_else(invalid)?;
        let node_id: NodeId = digits.parse().map_err(|_| invalid())?;
        if node_id.to_string() != digits {
            return Err(invalid());
        }
        Ok(node_id)
    }

    /// Ids of every node file present in the directory
    pub fn node_ids_on_disk(&self) -> SpatialResult<Vec<NodeId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.config.directory)? {
            let path = entry?.path();
            if let Ok(node_id) = self.node_id_from_path(&path) {
                ids.push(node_id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// Sync the point store to disk
    pub fn sync(&self) -> SpatialResult<()> {
        self.data_file.lock().sync_all()?;
        Ok(())
    }

    pub fn node_loads(&self) -> u64 {
        self.stats.node_loads.load(Ordering::Relaxed)
    }

    pub fn node_writes(&self) -> u64 {
        self.stats.node_writes.load(Ordering::Relaxed)
    }

    pub fn point_loads(&self) -> u64 {
        self.stats.point_loads.load(Ordering::Relaxed)
    }

    pub fn point_writes(&self) -> u64 {
        self.stats.point_writes.load(Ordering::Relaxed)
    }

    // ------------------------------------------------------------------------
    // Tree snapshots
    // ------------------------------------------------------------------------

    /// Writes `snapshot` to `destination`, replacing any existing file.
    pub fn save_tree(snapshot: &TreeSnapshot, destination: &Path) -> SaveStatus {
        match Self::write_snapshot(snapshot, destination, true) {
            Ok(()) => SaveStatus::Saved,
            Err(e) => {
                log::error!("Error while saving tree to {:?}: {}", destination, e);
                SaveStatus::DestinationUnwritable
            }
        }
    }

    /// Replaces `destination` with the encoded snapshot.
    pub(crate) fn write_snapshot(
        snapshot: &TreeSnapshot,
        destination: &Path,
        sync: bool,
    ) -> SpatialResult<()> {
        Self::stage_snapshot(snapshot, destination, sync)?.commit()
    }

    /// Writes the encoded snapshot beside `destination` without replacing it.
    pub(crate) fn stage_snapshot(
        snapshot: &TreeSnapshot,
        destination: &Path,
        sync: bool,
    ) -> SpatialResult<StagedWrite> {
        let bytes = bincode::serde::encode_to_vec(snapshot, bincode::config::legacy())
            .map_err(|e| SpatialError::Serialization(e.to_string()))?;
        StagedWrite::write(destination.to_path_buf(), &bytes, sync)
    }

    /// Reads a snapshot written by [`save_tree`](Self::save_tree).
    pub fn load_tree(source: &Path) -> SpatialResult<TreeSnapshot> {
        let bytes = fs::read(source)?;
        let snapshot: TreeSnapshot =
            bincode::serde::decode_from_slice(&bytes, bincode::config::legacy())
                .map(|(snapshot, _)| snapshot)
                .map_err(|e| SpatialError::CorruptRecord(format!("snapshot {:?}: {}", source, e)))?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}
