//! Construction-time configuration for the disk-based R*-tree.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::rtree_constants::{
    DATA_FILE, DEFAULT_CAPACITY, DEFAULT_MIN_FILL, NODE_FILE_PREFIX, NODE_FILE_SUFFIX, TREE_FILE,
};
use super::rtree_types::{SpatialError, SpatialResult};

/// Configuration injected into [`RStarTree`](super::RStarTree) and
/// [`StorageManager`](super::StorageManager).
///
/// Every file of a tree lives under `directory`: the point store
/// (`data_file`), one file per node (`node_file_prefix + id +
/// node_file_suffix`) and the tree snapshot (`tree_file`).
///
/// # Examples
///
/// ```rust
/// use rstar_disk::TreeConfig;
///
/// let config = TreeConfig::new("/tmp/my-index", 2)
///     .with_capacity(16)
///     .with_min_fill(0.4);
/// assert_eq!(config.min_entries(), 6);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    pub directory: PathBuf,
    pub dimension: usize,
    pub capacity: usize,
    /// Minimum fill of split groups, as a fraction of `capacity`
    pub min_fill: f64,
    pub node_file_prefix: String,
    pub node_file_suffix: String,
    pub data_file: String,
    pub tree_file: String,
    /// Call `sync_data` after every write
    pub sync_writes: bool,
}

impl TreeConfig {
    /// Creates a configuration with default capacity, fill and file names.
    pub fn new(directory: impl AsRef<Path>, dimension: usize) -> Self {
        TreeConfig {
            directory: directory.as_ref().to_path_buf(),
            dimension,
            capacity: DEFAULT_CAPACITY,
            min_fill: DEFAULT_MIN_FILL,
            node_file_prefix: NODE_FILE_PREFIX.to_string(),
            node_file_suffix: NODE_FILE_SUFFIX.to_string(),
            data_file: DATA_FILE.to_string(),
            tree_file: TREE_FILE.to_string(),
            sync_writes: true,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_min_fill(mut self, min_fill: f64) -> Self {
        self.min_fill = min_fill;
        self
    }

    pub fn with_node_file_naming(mut self, prefix: &str, suffix: &str) -> Self {
        self.node_file_prefix = prefix.to_string();
        self.node_file_suffix = suffix.to_string();
        self
    }

    pub fn with_data_file(mut self, data_file: &str) -> Self {
        self.data_file = data_file.to_string();
        self
    }

    pub fn with_tree_file(mut self, tree_file: &str) -> Self {
        self.tree_file = tree_file.to_string();
        self
    }

    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    /// Minimum number of entries in each group produced by a split.
    pub fn min_entries(&self) -> usize {
        ((self.capacity as f64 * self.min_fill).floor() as usize).max(1)
    }

    pub fn data_path(&self) -> PathBuf {
        self.directory.join(&self.data_file)
    }

    pub fn tree_path(&self) -> PathBuf {
        self.directory.join(&self.tree_file)
    }

    /// Checks that the configuration can build a valid tree.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidConfig`] when the dimension is zero,
    /// the capacity cannot hold two split groups, the minimum fill is
    /// outside `(0, 0.5]`, or the node file suffix is empty or starts
    /// with a digit (the id could not be recovered from a file name).
    pub fn validate(&self) -> SpatialResult<()> {
        if self.dimension == 0 {
            return Err(SpatialError::InvalidConfig(
                "dimension must be at least 1".into(),
            ));
        }
        if self.capacity < 2 {
            return Err(SpatialError::InvalidConfig(format!(
                "capacity {} cannot form two split groups (minimum 2)",
                self.capacity
            )));
        }
        if !(self.min_fill > 0.0 && self.min_fill <= 0.5) {
            return Err(SpatialError::InvalidConfig(format!(
                "min fill {} must lie in (0, 0.5]",
                self.min_fill
            )));
        }
        if self
            .node_file_suffix
            .chars()
            .next()
            .map_or(true, |c| c.is_ascii_digit())
        {
            return Err(SpatialError::InvalidConfig(format!(
                "node file suffix {:?} must be non-empty and not start with a digit",
                self.node_file_suffix
            )));
        }
        if self.data_file.is_empty() || self.tree_file.is_empty() {
            return Err(SpatialError::InvalidConfig(
                "data and tree file names must not be empty".into(),
            ));
        }
        Ok(())
    }
}
