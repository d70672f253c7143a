//! RStarTree implementation.
//!
//! The tree keeps only identifiers and counters of its own; nodes live in a
//! [`NodeArena`] and are pulled from the node store the first time a
//! traversal reaches them. Every insert and remove writes the nodes it
//! touched, and the tree snapshot, before returning.

use std::collections::HashSet;
use std::path::Path;

use super::integrity::{self, IntegrityReport};
use super::rtree_arena::NodeArena;
use super::rtree_config::TreeConfig;
use super::rtree_constants::{FIRST_NODE_ID, MAGIC, VERSION};
use super::rtree_node::{ChildRef, InternalNode, LeafEntry, LeafNode, Node};
use super::rtree_split::split;
use super::rtree_storage::StorageManager;
use super::rtree_types::{
    NodeId, Overflow, RTreeStats, SaveStatus, SpatialError, SpatialResult, TreeSnapshot,
};
use crate::geometry::{HyperRectangle, SpatialPoint};

/// Disk-backed R*-tree over points of a fixed dimension.
///
/// Single writer: the tree takes `&mut self` for every traversal because
/// reading a node may load it into the arena.
pub struct RStarTree {
    config: TreeConfig,
    storage: StorageManager,
    arena: NodeArena,
    root_id: NodeId,
    next_node_id: NodeId,
    entry_count: u64,
    height: u32,
    splits: u64,
    closed: bool,
}

impl RStarTree {
    /// Create a new, empty tree under `config.directory`. Files of a tree
    /// previously stored there are discarded.
    pub fn create(config: TreeConfig) -> SpatialResult<Self> {
        let storage = StorageManager::create(&config)?;

        let mut root = Node::Leaf(LeafNode::new(
            FIRST_NODE_ID,
            config.dimension,
            config.capacity,
        ));
        storage.save(&mut root)?;

        let mut arena = NodeArena::new();
        arena.insert(root);

        let tree = Self {
            config,
            storage,
            arena,
            root_id: FIRST_NODE_ID,
            next_node_id: FIRST_NODE_ID + 1,
            entry_count: 0,
            height: 1,
            splits: 0,
            closed: false,
        };
        tree.write_snapshot()?;

        log::info!(
            "Created R*-tree in {:?} (dimension {}, capacity {})",
            tree.config.directory,
            tree.config.dimension,
            tree.config.capacity
        );
        Ok(tree)
    }

    /// Open an existing tree. Only the snapshot is read here; nodes are
    /// loaded on demand.
    pub fn open(config: TreeConfig) -> SpatialResult<Self> {
        config.validate()?;
        let snapshot = StorageManager::load_tree(&config.tree_path())?;
        snapshot.check_config(&config)?;
        let storage = StorageManager::open(&config)?;

        log::info!(
            "Opened R*-tree in {:?} ({} entries, height {})",
            config.directory,
            snapshot.entry_count,
            snapshot.height
        );
        Ok(Self {
            config,
            storage,
            arena: NodeArena::new(),
            root_id: snapshot.root_id,
            next_node_id: snapshot.next_node_id,
            entry_count: snapshot.entry_count,
            height: snapshot.height,
            splits: 0,
            closed: false,
        })
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Number of points in the tree
    pub fn len(&self) -> u64 {
        self.entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    /// Number of levels, 1 for a tree whose root is a leaf
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    pub fn root_id(&self) -> NodeId {
        self.root_id
    }

    /// Get tree statistics
    pub fn stats(&self) -> RTreeStats {
        RTreeStats {
            total_entries: self.entry_count,
            resident_nodes: self.arena.len() as u64,
            node_loads: self.storage.node_loads(),
            node_writes: self.storage.node_writes(),
            point_writes: self.storage.point_writes(),
            splits: self.splits,
            tree_height: self.height,
        }
    }

    /// The current whole-tree snapshot
    pub fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            magic: MAGIC,
            version: VERSION,
            root_id: self.root_id,
            dimension: self.config.dimension as u32,
            capacity: self.config.capacity as u32,
            min_fill: self.config.min_fill,
            next_node_id: self.next_node_id,
            entry_count: self.entry_count,
            height: self.height,
        }
    }

    /// Export the snapshot to `destination`.
    pub fn save_tree(&self, destination: impl AsRef<Path>) -> SaveStatus {
        StorageManager::save_tree(&self.snapshot(), destination.as_ref())
    }

    /// Write the snapshot to the tree file and sync both stores.
    pub fn flush(&self) -> SpatialResult<()> {
        StorageManager::write_snapshot(&self.snapshot(), &self.config.tree_path(), true)?;
        self.storage.sync()
    }

    /// Flush and release the stores.
    pub fn close(mut self) -> SpatialResult<()> {
        self.flush()?;
        self.closed = true;
        log::debug!("Closed R*-tree in {:?}", self.config.directory);
        Ok(())
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Insert a point. Duplicates are kept as separate entries.
    ///
    /// A point with a NaN or infinite coordinate is rejected. If the changed
    /// nodes cannot be written, the tree returns to its last committed state.
    pub fn insert(&mut self, point: SpatialPoint) -> SpatialResult<()> {
        self.check_point(&point)?;
        let bounds = HyperRectangle::from_point(&point);
        let (leaf_id, path) = self.choose_leaf(&bounds)?;

        let committed = self.snapshot();
        self.insert_at(leaf_id, &path, point)
            .map_err(|e| self.roll_back(&committed, e))
    }

    fn insert_at(
        &mut self,
        leaf_id: NodeId,
        path: &[(NodeId, usize)],
        point: SpatialPoint,
    ) -> SpatialResult<()> {
        let overflow = match self.node_mut(leaf_id)? {
            Node::Leaf(leaf) => leaf.insert(point).err(),
            Node::Internal(_) => return Err(not_a_leaf(leaf_id)),
        };

        // new nodes, children before parents
        let mut created = Vec::new();
        let mut sibling = match overflow {
            Some(Overflow(point)) => {
                let sibling = self.split_leaf(leaf_id, point)?;
                created.push(sibling.node_id);
                Some(sibling)
            }
            None => None,
        };

        let mut touched = vec![leaf_id];
        let mut child_id = leaf_id;
        for &(parent_id, index) in path.iter().rev() {
            let child_mbr = self.node(child_id)?.mbr().clone();
            let overflow = match self.node_mut(parent_id)? {
                Node::Internal(parent) => {
                    parent.set_child_mbr(index, child_mbr);
                    match sibling.take() {
                        Some(new_child) => parent.insert(new_child).err(),
                        None => None,
                    }
                }
                Node::Leaf(_) => return Err(not_internal(parent_id)),
            };
            if let Some(Overflow(extra)) = overflow {
                let new_sibling = self.split_internal(parent_id, extra)?;
                created.push(new_sibling.node_id);
                sibling = Some(new_sibling);
            }
            touched.push(parent_id);
            child_id = parent_id;
        }

        if let Some(sibling) = sibling {
            self.grow_root(sibling)?;
            created.push(self.root_id);
        }

        self.entry_count += 1;
        created.extend(touched.into_iter().rev());
        self.persist(&created)
    }

    /// Descend from the root to the leaf that should receive `bounds`.
    /// Returns the leaf id and the `(node, child index)` path leading to it.
    fn choose_leaf(
        &mut self,
        bounds: &HyperRectangle,
    ) -> SpatialResult<(NodeId, Vec<(NodeId, usize)>)> {
        let mut path = Vec::with_capacity(self.height as usize);
        let mut current = self.root_id;
        loop {
            match self.node(current)? {
                Node::Leaf(_) => return Ok((current, path)),
                Node::Internal(internal) => {
                    let index = internal.choose_subtree(bounds);
                    let child = internal.children()[index].node_id;
                    path.push((current, index));
                    current = child;
                }
            }
        }
    }

    fn split_leaf(&mut self, leaf_id: NodeId, extra: SpatialPoint) -> SpatialResult<ChildRef> {
        let (dimension, capacity) = (self.config.dimension, self.config.capacity);
        let min_entries = self.config.min_entries();
        let sibling_id = self.allocate_node_id();

        let Node::Leaf(leaf) = self.node_mut(leaf_id)? else {
            return Err(not_a_leaf(leaf_id));
        };
        let mut entries = leaf.take_entries();
        entries.push((extra, None));
        let (kept, moved) = split(
            entries,
            |entry: &LeafEntry| HyperRectangle::from_point(&entry.0),
            dimension,
            min_entries,
        );
        *leaf = LeafNode::from_entries(leaf_id, dimension, capacity, kept);

        let sibling = LeafNode::from_entries(sibling_id, dimension, capacity, moved);
        let child = ChildRef {
            node_id: sibling_id,
            mbr: sibling.mbr().clone(),
        };
        log::debug!(
            "Split leaf {} into {} and {} ({} points)",
            leaf_id,
            leaf_id,
            sibling_id,
            sibling.len()
        );
        self.arena.insert(Node::Leaf(sibling));
        self.splits += 1;
        Ok(child)
    }

    fn split_internal(&mut self, node_id: NodeId, extra: ChildRef) -> SpatialResult<ChildRef> {
        let (dimension, capacity) = (self.config.dimension, self.config.capacity);
        let min_entries = self.config.min_entries();
        let sibling_id = self.allocate_node_id();

        let Node::Internal(node) = self.node_mut(node_id)? else {
            return Err(not_internal(node_id));
        };
        let mut children = node.take_children();
        children.push(extra);
        let (kept, moved) = split(
            children,
            |child: &ChildRef| child.mbr.clone(),
            dimension,
            min_entries,
        );
        *node = InternalNode::from_children(node_id, dimension, capacity, kept);

        let sibling = InternalNode::from_children(sibling_id, dimension, capacity, moved);
        let child = ChildRef {
            node_id: sibling_id,
            mbr: sibling.mbr().clone(),
        };
        log::debug!(
            "Split internal node {} into {} and {}",
            node_id,
            node_id,
            sibling_id
        );
        self.arena.insert(Node::Internal(sibling));
        self.splits += 1;
        Ok(child)
    }

    /// The root split: put both halves under a new internal root.
    fn grow_root(&mut self, sibling: ChildRef) -> SpatialResult<()> {
        let old_root = ChildRef {
            node_id: self.root_id,
            mbr: self.node(self.root_id)?.mbr().clone(),
        };
        let new_root_id = self.allocate_node_id();
        let root = InternalNode::from_children(
            new_root_id,
            self.config.dimension,
            self.config.capacity,
            vec![old_root, sibling],
        );
        self.arena.insert(Node::Internal(root));
        self.root_id = new_root_id;
        self.height += 1;
        log::debug!("New root {} at height {}", new_root_id, self.height);
        Ok(())
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Lazily yields every point lying inside `region`, in descent order.
    ///
    /// Nodes are loaded as the iterator reaches them. A failed load is
    /// yielded once as an error and ends the iteration.
    pub fn search(&mut self, region: &HyperRectangle) -> SpatialResult<Search<'_>> {
        self.check_dimension(region.dimension())?;
        let stack = vec![self.root_id];
        Ok(Search {
            tree: self,
            region: region.clone(),
            stack,
            pending: Vec::new().into_iter(),
        })
    }

    /// Find the `k` points nearest to `query`, nearest first, with their
    /// Euclidean distances.
    pub fn nearest(
        &mut self,
        query: &SpatialPoint,
        k: usize,
    ) -> SpatialResult<Vec<(SpatialPoint, f64)>> {
        self.check_point(query)?;
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut results = Vec::with_capacity(k + 1);
        let mut max_dist = f64::INFINITY;
        self.nearest_recursive(self.root_id, query, k, &mut results, &mut max_dist)?;

        results.sort_by(|a, b| a.1.total_cmp(&b.1));
        results.truncate(k);
        Ok(results)
    }

    fn nearest_recursive(
        &mut self,
        node_id: NodeId,
        query: &SpatialPoint,
        k: usize,
        results: &mut Vec<(SpatialPoint, f64)>,
        max_dist: &mut f64,
    ) -> SpatialResult<()> {
        let mut candidates: Vec<(NodeId, f64)> = match self.node(node_id)? {
            Node::Leaf(leaf) => {
                for point in leaf.points() {
                    let dist = point.distance_squared(query).sqrt();
                    if dist <= *max_dist {
                        results.push((point.clone(), dist));
                        if results.len() >= k {
                            results.sort_by(|a, b| a.1.total_cmp(&b.1));
                            results.truncate(k);
                            if let Some((_, kth_dist)) = results.last() {
                                *max_dist = *kth_dist;
                            }
                        }
                    }
                }
                return Ok(());
            }
            Node::Internal(internal) => internal
                .children()
                .iter()
                .map(|child| (child.node_id, child.mbr.min_distance_squared(query).sqrt()))
                .collect(),
        };

        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
        for (child_id, dist) in candidates {
            if dist > *max_dist {
                continue;
            }
            self.nearest_recursive(child_id, query, k, results, max_dist)?;
        }
        Ok(())
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Remove one occurrence of `point`. Returns false if it is not stored.
    ///
    /// A node left empty is unlinked from its parent and its file deleted.
    /// While the root is an internal node with a single child, that child
    /// becomes the root. A failed write restores the last committed state.
    pub fn remove(&mut self, point: &SpatialPoint) -> SpatialResult<bool> {
        self.check_dimension(point.dimension())?;
        let mut path = Vec::new();
        let Some(leaf_id) = self.find_leaf(self.root_id, point, &mut path)? else {
            return Ok(false);
        };

        let committed = self.snapshot();
        let unlinked = self
            .remove_at(leaf_id, &path, point)
            .map_err(|e| self.roll_back(&committed, e))?;
        for node_id in unlinked {
            self.arena.remove(node_id);
            // already unreachable from the committed tree
            if let Err(e) = self.storage.delete_node(node_id) {
                log::warn!("Failed to delete unlinked node {}: {}", node_id, e);
            }
        }
        Ok(true)
    }

    /// Returns the ids of the nodes unlinked from the tree.
    fn remove_at(
        &mut self,
        leaf_id: NodeId,
        path: &[(NodeId, usize)],
        point: &SpatialPoint,
    ) -> SpatialResult<Vec<NodeId>> {
        let mut child_empty = match self.node_mut(leaf_id)? {
            Node::Leaf(leaf) => {
                // the point record stays in the append-only store
                leaf.remove_point(point);
                leaf.is_empty()
            }
            Node::Internal(_) => return Err(not_a_leaf(leaf_id)),
        };

        let mut touched = vec![leaf_id];
        let mut unlinked = Vec::new();
        let mut child_id = leaf_id;
        for &(parent_id, index) in path.iter().rev() {
            let child_mbr = self.node(child_id)?.mbr().clone();
            let Node::Internal(parent) = self.node_mut(parent_id)? else {
                return Err(not_internal(parent_id));
            };
            if child_empty {
                parent.remove_child(index);
                unlinked.push(child_id);
            } else {
                parent.set_child_mbr(index, child_mbr);
            }
            child_empty = parent.is_empty();
            touched.push(parent_id);
            child_id = parent_id;
        }

        unlinked.extend(self.shrink_root()?);
        self.entry_count -= 1;

        touched.retain(|id| !unlinked.contains(id));
        // root first, then down to the leaf
        let mut order = vec![self.root_id];
        order.extend(touched.into_iter().rev());
        self.persist(&order)?;
        Ok(unlinked)
    }

    /// Depth-first search for a leaf holding `point`, recording the path.
    fn find_leaf(
        &mut self,
        node_id: NodeId,
        point: &SpatialPoint,
        path: &mut Vec<(NodeId, usize)>,
    ) -> SpatialResult<Option<NodeId>> {
        let candidates: Vec<(usize, NodeId)> = match self.node(node_id)? {
            Node::Leaf(leaf) => return Ok(leaf.points().contains(point).then_some(node_id)),
            Node::Internal(internal) => internal
                .children()
                .iter()
                .enumerate()
                .filter(|(_, child)| child.mbr.contains_point(point))
                .map(|(index, child)| (index, child.node_id))
                .collect(),
        };

        for (index, child_id) in candidates {
            path.push((node_id, index));
            if let Some(leaf_id) = self.find_leaf(child_id, point, path)? {
                return Ok(Some(leaf_id));
            }
            path.pop();
        }
        Ok(None)
    }

    /// Collapse single-child internal roots and replace an empty internal
    /// root with a fresh leaf. Returns the ids of the discarded roots.
    fn shrink_root(&mut self) -> SpatialResult<Vec<NodeId>> {
        let mut discarded = Vec::new();
        loop {
            let next_root = match self.node(self.root_id)? {
                Node::Internal(root) if root.len() == 1 => root.children()[0].node_id,
                _ => break,
            };
            discarded.push(self.root_id);
            self.root_id = next_root;
            self.height -= 1;
            log::debug!("Root collapsed to {} at height {}", next_root, self.height);
        }

        if matches!(self.node(self.root_id)?, Node::Internal(root) if root.is_empty()) {
            discarded.push(self.root_id);
            let leaf_id = self.allocate_node_id();
            self.arena.insert(Node::Leaf(LeafNode::new(
                leaf_id,
                self.config.dimension,
                self.config.capacity,
            )));
            self.root_id = leaf_id;
            self.height = 1;
            log::debug!("Tree emptied, new root leaf {}", leaf_id);
        }
        Ok(discarded)
    }

    // ========================================================================
    // Integrity
    // ========================================================================

    /// Walk every reachable node and verify the structural invariants:
    /// tight bounds at every level, parent-held child bounds matching the
    /// child, capacity, leaf depth equal to the height, and the point count.
    ///
    /// Nodes that fail to load are reported rather than returned as errors.
    pub fn check_integrity(&mut self) -> SpatialResult<IntegrityReport> {
        let mut report = IntegrityReport::new();
        let root_id = self.root_id;
        let height = self.height;
        let min_entries = self.config.min_entries();

        let mut stack: Vec<(NodeId, u32, Option<HyperRectangle>)> = vec![(root_id, 1, None)];
        while let Some((node_id, depth, parent_view)) = stack.pop() {
            let node = match self.node(node_id) {
                Ok(node) => node,
                Err(e) => {
                    report.corrupted_nodes.push(node_id);
                    report.record_error(format!("node {}: {}", node_id, e));
                    continue;
                }
            };
            report.nodes_checked += 1;
            integrity::check_node(node, node_id == root_id, min_entries, &mut report);

            if let Some(expected) = parent_view {
                if node.mbr() != &expected {
                    report.record_error(format!(
                        "parent holds bounds {} for node {}, node has {}",
                        expected,
                        node_id,
                        node.mbr()
                    ));
                }
            }

            match node {
                Node::Leaf(leaf) => {
                    report.points_counted += leaf.len() as u64;
                    if depth != height {
                        report.record_error(format!(
                            "leaf {} at depth {}, tree height is {}",
                            node_id, depth, height
                        ));
                    }
                }
                Node::Internal(internal) => {
                    if depth >= height {
                        report.record_error(format!(
                            "internal node {} at depth {}, tree height is {}",
                            node_id, depth, height
                        ));
                        continue;
                    }
                    for child in internal.children().iter().rev() {
                        stack.push((child.node_id, depth + 1, Some(child.mbr.clone())));
                    }
                }
            }
        }

        if report.points_counted != self.entry_count {
            report.record_error(format!(
                "found {} points, tree records {}",
                report.points_counted, self.entry_count
            ));
        }
        Ok(report)
    }

    // ========================================================================
    // Node access and persistence
    // ========================================================================

    /// Read a node from the arena, loading it from the node store first if
    /// it is not resident.
    fn node(&mut self, node_id: NodeId) -> SpatialResult<&Node> {
        self.ensure_resident(node_id)?;
        self.arena.get(node_id).ok_or_else(|| not_resident(node_id))
    }

    fn node_mut(&mut self, node_id: NodeId) -> SpatialResult<&mut Node> {
        self.ensure_resident(node_id)?;
        self.arena.get_mut(node_id).ok_or_else(|| not_resident(node_id))
    }

    fn ensure_resident(&mut self, node_id: NodeId) -> SpatialResult<()> {
        if !self.arena.contains(node_id) {
            let node = self.storage.load(node_id)?;
            self.arena.insert(node);
        }
        Ok(())
    }

    fn allocate_node_id(&mut self) -> NodeId {
        let node_id = self.next_node_id;
        self.next_node_id += 1;
        node_id
    }

    /// Save each listed node once, in order, then the snapshot.
    ///
    /// Every record is staged before the first one replaces its file, so a
    /// failed write leaves the stores as they were. Callers list new nodes
    /// ahead of the existing nodes that point at them.
    fn persist(&mut self, node_ids: &[NodeId]) -> SpatialResult<()> {
        let mut seen = HashSet::with_capacity(node_ids.len());
        let mut staged = Vec::with_capacity(node_ids.len());
        for &node_id in node_ids {
            if !seen.insert(node_id) {
                continue;
            }
            let node = self
                .arena
                .get_mut(node_id)
                .ok_or_else(|| not_resident(node_id))?;
            staged.push(self.storage.stage(node)?);
        }
        let snapshot = StorageManager::stage_snapshot(
            &self.snapshot(),
            &self.config.tree_path(),
            self.config.sync_writes,
        )?;

        for write in staged {
            self.storage.commit(write)?;
        }
        snapshot.commit()
    }

    /// Return to `committed` after a failed mutation. Resident nodes are
    /// dropped so they are read back from the node store.
    fn roll_back(&mut self, committed: &TreeSnapshot, error: SpatialError) -> SpatialError {
        log::error!(
            "Write to R*-tree in {:?} failed, reverting to the last committed state: {}",
            self.config.directory,
            error
        );
        self.root_id = committed.root_id;
        self.next_node_id = committed.next_node_id;
        self.entry_count = committed.entry_count;
        self.height = committed.height;
        self.arena.clear();
        error
    }

    fn write_snapshot(&self) -> SpatialResult<()> {
        StorageManager::write_snapshot(
            &self.snapshot(),
            &self.config.tree_path(),
            self.config.sync_writes,
        )
    }

    fn check_point(&self, point: &SpatialPoint) -> SpatialResult<()> {
        self.check_dimension(point.dimension())?;
        if !point.is_finite() {
            return Err(SpatialError::InvalidOperation(format!(
                "{} has a non-finite coordinate",
                point
            )));
        }
        Ok(())
    }

    fn check_dimension(&self, dimension: usize) -> SpatialResult<()> {
        if dimension != self.config.dimension {
            return Err(SpatialError::InvalidOperation(format!(
                "expected dimension {}, got {}",
                self.config.dimension, dimension
            )));
        }
        Ok(())
    }
}

fn not_resident(node_id: NodeId) -> SpatialError {
    SpatialError::InvalidOperation(format!("node {} is not resident", node_id))
}

fn not_a_leaf(node_id: NodeId) -> SpatialError {
    SpatialError::CorruptRecord(format!("node {} was expected to be a leaf", node_id))
}

fn not_internal(node_id: NodeId) -> SpatialError {
    SpatialError::CorruptRecord(format!(
        "node {} was expected to be an internal node",
        node_id
    ))
}

// ============================================================================
// Search Iterator
// ============================================================================

/// Lazy region query over an [`RStarTree`], created by
/// [`RStarTree::search`].
pub struct Search<'a> {
    tree: &'a mut RStarTree,
    region: HyperRectangle,
    stack: Vec<NodeId>,
    pending: std::vec::IntoIter<SpatialPoint>,
}

impl Iterator for Search<'_> {
    type Item = SpatialResult<SpatialPoint>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(point) = self.pending.next() {
                return Some(Ok(point));
            }
            let node_id = self.stack.pop()?;
            match self.tree.node(node_id) {
                Ok(Node::Leaf(leaf)) => {
                    self.pending = leaf.overlapping_children(&self.region).into_iter();
                }
                Ok(Node::Internal(internal)) => {
                    let children: Vec<NodeId> = internal
                        .overlapping_children(&self.region)
                        .iter()
                        .map(|child| child.node_id)
                        .collect();
                    self.stack.extend(children.into_iter().rev());
                }
                Err(e) => {
                    self.stack.clear();
                    return Some(Err(e));
                }
            }
        }
    }
}

// ============================================================================
// Drop Implementation
// ============================================================================

impl Drop for RStarTree {
    fn drop(&mut self) {
        // Best effort flush on drop
        if !self.closed {
            if let Err(e) = self.flush() {
                log::warn!(
                    "Failed to flush R*-tree in {:?} on drop: {}",
                    self.config.directory,
                    e
                );
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
