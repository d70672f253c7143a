//! Leaf and internal nodes of the R*-tree.
//!
//! A [`Node`] is a tagged variant over [`LeafNode`] and [`InternalNode`].
//! Both keep `mbr` equal to the tight bound of their current contents and
//! both refuse entries beyond their capacity with [`Overflow`], leaving the
//! split to the tree.

use super::rtree_types::{NodeId, NodeKind, NodeRecord, Overflow, PointOffset};
use crate::geometry::{HyperRectangle, SpatialPoint};

/// A point held by a leaf together with its store offset, if flushed.
pub(crate) type LeafEntry = (SpatialPoint, Option<PointOffset>);

/// A child reference in an internal node
#[derive(Debug, Clone, PartialEq)]
pub struct ChildRef {
    pub node_id: NodeId,
    pub mbr: HyperRectangle,
}

// ============================================================================
// Leaf
// ============================================================================

/// Leaf node holding points.
///
/// `offsets` runs parallel to a prefix of `points`: `offsets[i]` is the
/// point store address of `points[i]`. Points past `offsets.len()` are
/// unsaved and get flushed by the storage layer on the next save.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafNode {
    id: NodeId,
    dimension: usize,
    capacity: usize,
    mbr: HyperRectangle,
    points: Vec<SpatialPoint>,
    offsets: Vec<PointOffset>,
}

impl LeafNode {
    pub fn new(id: NodeId, dimension: usize, capacity: usize) -> Self {
        LeafNode {
            id,
            dimension,
            capacity,
            mbr: HyperRectangle::new(dimension),
            points: Vec::with_capacity(capacity),
            offsets: Vec::with_capacity(capacity),
        }
    }

    /// Rebuilds a leaf read back from the node store. Every point is saved.
    pub(crate) fn from_parts(
        id: NodeId,
        capacity: usize,
        mbr: HyperRectangle,
        points: Vec<SpatialPoint>,
        offsets: Vec<PointOffset>,
    ) -> Self {
        LeafNode {
            id,
            dimension: mbr.dimension(),
            capacity,
            mbr,
            points,
            offsets,
        }
    }

    /// Builds a leaf from split entries. Saved points are placed ahead of
    /// unsaved ones so the offset prefix stays aligned.
    pub(crate) fn from_entries(
        id: NodeId,
        dimension: usize,
        capacity: usize,
        entries: Vec<LeafEntry>,
    ) -> Self {
        let mut leaf = LeafNode::new(id, dimension, capacity);
        let (saved, unsaved): (Vec<_>, Vec<_>) =
            entries.into_iter().partition(|(_, offset)| offset.is_some());
        for (point, offset) in saved.into_iter().chain(unsaved) {
            leaf.mbr.update(&point);
            leaf.points.push(point);
            if let Some(offset) = offset {
                leaf.offsets.push(offset);
            }
        }
        leaf
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn mbr(&self) -> &HyperRectangle {
        &self.mbr
    }

    pub fn points(&self) -> &[SpatialPoint] {
        &self.points
    }

    pub fn offsets(&self) -> &[PointOffset] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_not_full(&self) -> bool {
        self.points.len() < self.capacity
    }

    /// Appends a point and grows the MBR to include it. The point stays
    /// unsaved until the storage layer flushes it.
    pub fn insert(&mut self, point: SpatialPoint) -> Result<(), Overflow<SpatialPoint>> {
        if !self.is_not_full() {
            return Err(Overflow(point));
        }
        self.mbr.update(&point);
        self.points.push(point);
        Ok(())
    }

    /// Returns exactly the points lying inside `region`.
    ///
    /// A leaf whose MBR misses the region is rejected without a scan.
    pub fn overlapping_children(&self, region: &HyperRectangle) -> Vec<SpatialPoint> {
        match self.mbr.intersection(region) {
            None => Vec::new(),
            Some(_) => self
                .points
                .iter()
                .filter(|p| region.contains_point(p))
                .cloned()
                .collect(),
        }
    }

    pub fn has_unsaved_points(&self) -> bool {
        self.points.len() > self.offsets.len()
    }

    pub fn first_unsaved_index(&self) -> Option<usize> {
        self.has_unsaved_points().then_some(self.offsets.len())
    }

    /// Records the store offset of the first unsaved point.
    pub(crate) fn record_offset(&mut self, offset: PointOffset) {
        debug_assert!(self.has_unsaved_points());
        self.offsets.push(offset);
    }

    /// Drains every point with its offset, leaving the leaf empty.
    pub(crate) fn take_entries(&mut self) -> Vec<LeafEntry> {
        let mut offsets = std::mem::take(&mut self.offsets).into_iter();
        let entries = std::mem::take(&mut self.points)
            .into_iter()
            .map(|p| (p, offsets.next()))
            .collect();
        self.mbr = HyperRectangle::new(self.dimension);
        entries
    }

    /// Removes the first point equal to `point` and shrinks the MBR.
    pub(crate) fn remove_point(&mut self, point: &SpatialPoint) -> Option<LeafEntry> {
        let index = self.points.iter().position(|p| p == point)?;
        let removed = self.points.remove(index);
        let offset = (index < self.offsets.len()).then(|| self.offsets.remove(index));
        self.recompute_mbr();
        Some((removed, offset))
    }

    fn recompute_mbr(&mut self) {
        let mut mbr = HyperRectangle::new(self.dimension);
        for p in &self.points {
            mbr.update(p);
        }
        self.mbr = mbr;
    }

    /// Encodes the saved part of this leaf.
    pub fn to_record(&self) -> NodeRecord {
        NodeRecord {
            kind: NodeKind::Leaf,
            dimension: self.dimension as u32,
            mbr: self.mbr.clone(),
            children: self.offsets.clone(),
            child_mbrs: Vec::new(),
        }
    }
}

// ============================================================================
// Internal
// ============================================================================

/// Internal node holding child references with their bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalNode {
    id: NodeId,
    dimension: usize,
    capacity: usize,
    mbr: HyperRectangle,
    children: Vec<ChildRef>,
}

impl InternalNode {
    pub fn new(id: NodeId, dimension: usize, capacity: usize) -> Self {
        InternalNode {
            id,
            dimension,
            capacity,
            mbr: HyperRectangle::new(dimension),
            children: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn from_children(
        id: NodeId,
        dimension: usize,
        capacity: usize,
        children: Vec<ChildRef>,
    ) -> Self {
        let mut node = InternalNode::new(id, dimension, capacity);
        for child in &children {
            node.mbr.expand(&child.mbr);
        }
        node.children = children;
        node
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn mbr(&self) -> &HyperRectangle {
        &self.mbr
    }

    pub fn children(&self) -> &[ChildRef] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_not_full(&self) -> bool {
        self.children.len() < self.capacity
    }

    /// Appends a child and unions its bounds into this node's MBR.
    pub fn insert(&mut self, child: ChildRef) -> Result<(), Overflow<ChildRef>> {
        if !self.is_not_full() {
            return Err(Overflow(child));
        }
        self.mbr.expand(&child.mbr);
        self.children.push(child);
        Ok(())
    }

    /// Picks the child needing the least area enlargement to cover
    /// `bounds`; ties go to the smaller resulting area, then the lower index.
    pub fn choose_subtree(&self, bounds: &HyperRectangle) -> usize {
        let mut best_idx = 0;
        let mut best_enlargement = f64::INFINITY;
        let mut best_area = f64::INFINITY;

        for (i, child) in self.children.iter().enumerate() {
            let area = child.mbr.area();
            let enlarged = child.mbr.union(bounds).area();
            let enlargement = enlarged - area;

            if enlargement < best_enlargement
                || (enlargement == best_enlargement && enlarged < best_area)
            {
                best_enlargement = enlargement;
                best_area = enlarged;
                best_idx = i;
            }
        }
        best_idx
    }

    /// Children whose MBR intersects `region`.
    pub fn overlapping_children(&self, region: &HyperRectangle) -> Vec<&ChildRef> {
        self.children
            .iter()
            .filter(|c| c.mbr.intersects(region))
            .collect()
    }

    /// Replaces the stored bounds of child `index` and re-derives this MBR.
    pub(crate) fn set_child_mbr(&mut self, index: usize, mbr: HyperRectangle) {
        self.children[index].mbr = mbr;
        self.recompute_mbr();
    }

    pub(crate) fn remove_child(&mut self, index: usize) -> ChildRef {
        let child = self.children.remove(index);
        self.recompute_mbr();
        child
    }

    /// Drains every child, leaving the node empty.
    pub(crate) fn take_children(&mut self) -> Vec<ChildRef> {
        self.mbr = HyperRectangle::new(self.dimension);
        std::mem::take(&mut self.children)
    }

    fn recompute_mbr(&mut self) {
        let mut mbr = HyperRectangle::new(self.dimension);
        for c in &self.children {
            mbr.expand(&c.mbr);
        }
        self.mbr = mbr;
    }

    pub fn to_record(&self) -> NodeRecord {
        NodeRecord {
            kind: NodeKind::Internal,
            dimension: self.dimension as u32,
            mbr: self.mbr.clone(),
            children: self.children.iter().map(|c| c.node_id).collect(),
            child_mbrs: self.children.iter().map(|c| c.mbr.clone()).collect(),
        }
    }
}

// ============================================================================
// Node
// ============================================================================

/// Node types in the R*-tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Leaf node containing points
    Leaf(LeafNode),
    /// Internal node containing child references
    Internal(InternalNode),
}

impl Node {
    pub fn id(&self) -> NodeId {
        match self {
            Node::Leaf(leaf) => leaf.id(),
            Node::Internal(internal) => internal.id(),
        }
    }

    pub fn mbr(&self) -> &HyperRectangle {
        match self {
            Node::Leaf(leaf) => leaf.mbr(),
            Node::Internal(internal) => internal.mbr(),
        }
    }

    pub fn dimension(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.dimension(),
            Node::Internal(internal) => internal.dimension(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.len(),
            Node::Internal(internal) => internal.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_not_full(&self) -> bool {
        match self {
            Node::Leaf(leaf) => leaf.is_not_full(),
            Node::Internal(internal) => internal.is_not_full(),
        }
    }

    pub fn to_record(&self) -> NodeRecord {
        match self {
            Node::Leaf(leaf) => leaf.to_record(),
            Node::Internal(internal) => internal.to_record(),
        }
    }
}
