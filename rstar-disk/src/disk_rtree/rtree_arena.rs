//! Resident node arena for the R*-tree.
//!
//! Nodes are addressed by [`NodeId`], never by reference, so an internal
//! node's child list is a list of ids into this arena. The arena does NOT
//! preload anything: a node enters it when the tree creates it or when the
//! tree first reads it from the node store, and it stays for the session.

use std::collections::HashMap;

use super::rtree_node::Node;
use super::rtree_types::NodeId;

#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: HashMap<NodeId, Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    /// Returns None if the node is not resident (must be loaded from disk).
    pub fn get(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    pub fn get_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    pub fn contains(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(&node_id)
    }

    /// Insert a node, keyed by its own id
    pub fn insert(&mut self, node: Node) {
        self.nodes.insert(node.id(), node);
    }

    pub fn remove(&mut self, node_id: NodeId) -> Option<Node> {
        self.nodes.remove(&node_id)
    }

    /// Drop every resident node; later reads go back to the node store.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
