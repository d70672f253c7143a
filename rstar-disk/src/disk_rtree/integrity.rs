//! Structural integrity checks.
//!
//! The tree walk lives in [`RStarTree::check_integrity`]; this module holds
//! the report and the checks a single node must pass on its own.
//!
//! [`RStarTree::check_integrity`]: super::RStarTree::check_integrity

use super::rtree_node::Node;
use super::rtree_types::NodeId;
use crate::geometry::HyperRectangle;

/// Result of an integrity check
#[derive(Debug, Clone)]
pub struct IntegrityReport {
    /// Total nodes checked
    pub nodes_checked: u64,
    /// Points found in reachable leaves
    pub points_counted: u64,
    /// Nodes whose record could not be loaded
    pub corrupted_nodes: Vec<NodeId>,
    /// Non-root nodes below the minimum fill. Removal can leave these
    /// behind, so they do not invalidate the tree.
    pub underfull_nodes: Vec<NodeId>,
    /// Summary of findings
    pub is_valid: bool,
    /// Detailed error messages
    pub errors: Vec<String>,
}

impl IntegrityReport {
    pub fn new() -> Self {
        Self {
            nodes_checked: 0,
            points_counted: 0,
            corrupted_nodes: Vec::new(),
            underfull_nodes: Vec::new(),
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub(crate) fn record_error(&mut self, message: String) {
        self.errors.push(message);
        self.is_valid = false;
    }
}

impl Default for IntegrityReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks capacity, fill and MBR tightness of one node.
pub(crate) fn check_node(
    node: &Node,
    is_root: bool,
    min_entries: usize,
    report: &mut IntegrityReport,
) {
    let node_id = node.id();
    let (len, capacity, tight) = match node {
        Node::Leaf(leaf) => {
            if leaf.has_unsaved_points() {
                report.record_error(format!("leaf {} has unsaved points", node_id));
            }
            let mut tight = HyperRectangle::new(leaf.dimension());
            for point in leaf.points() {
                tight.update(point);
            }
            (leaf.len(), leaf.capacity(), tight)
        }
        Node::Internal(internal) => {
            if internal.is_empty() {
                report.record_error(format!("internal node {} has no children", node_id));
            }
            let mut tight = HyperRectangle::new(internal.dimension());
            for child in internal.children() {
                tight.expand(&child.mbr);
            }
            (internal.len(), internal.capacity(), tight)
        }
    };

    if len > capacity {
        report.record_error(format!(
            "node {} holds {} entries, capacity is {}",
            node_id, len, capacity
        ));
    }
    if !is_root && len < min_entries {
        report.underfull_nodes.push(node_id);
    }
    if node.mbr() != &tight {
        report.record_error(format!(
            "node {} has bounds {} but its contents span {}",
            node_id,
            node.mbr(),
            tight
        ));
    }
}
