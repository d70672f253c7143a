//! Constants for the disk-based R*-tree.

/// Default maximum number of entries per node (points in a leaf, children
/// in an internal node)
pub const DEFAULT_CAPACITY: usize = 64;

/// Default minimum fill of a node produced by a split, as a fraction of
/// capacity (typically 40%)
pub const DEFAULT_MIN_FILL: f64 = 0.4;

/// Node file name prefix; a node file is `prefix + id + suffix`
pub const NODE_FILE_PREFIX: &str = "node_";

/// Node file name suffix
pub const NODE_FILE_SUFFIX: &str = ".rnode";

/// Append-only point store file name
pub const DATA_FILE: &str = "points.dat";

/// Default tree snapshot file name
pub const TREE_FILE: &str = "rstar.tree";

/// First node id handed out by a fresh tree
pub const FIRST_NODE_ID: u64 = 1;

/// Magic number for snapshot identification
pub const MAGIC: u32 = 0x52535452; // "RSTR"

/// Snapshot and node record format version
pub const VERSION: u32 = 1;
