pub mod io;
pub mod ops;
pub mod query;
pub mod traversal;

use super::error::TreeError;
use super::node::{Node, NodeId};
use std::ops::Index;

#[derive(Debug, Default, Clone)]
pub struct Tree {
    /// Arena storage for all nodes
    pub(super) nodes: Vec<Node>,

    /// Optional root ID (a tree might be empty or in construction)
    pub(super) root: Option<NodeId>,

    /// The node at which ancestral adjacencies are evaluated
    pub(super) ancestor: Option<NodeId>,
}

impl Tree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new node to the tree. Returns the new node's ID.
    pub fn add_node(&mut self) -> NodeId {
        let id = self.nodes.len();
        let node = Node::new(id);
        self.nodes.push(node);
        id
    }

    /// Get number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get root ID
    pub fn get_root(&self) -> Option<NodeId> {
        self.root
    }

    /// Get a reference to a node by ID.
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Get a mutable reference to a node by ID.
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// All nodes of the arena, in ID order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Set a node as the root of the tree.
    pub fn set_root(&mut self, id: NodeId) {
        if self.get_node(id).is_some() {
            self.root = Some(id);
        }
    }

    /// Designated ancestor. Defaults to the root when no node was marked.
    pub fn get_ancestor(&self) -> Option<NodeId> {
        self.ancestor.or(self.root)
    }

    pub fn set_ancestor(&mut self, id: NodeId) {
        if self.get_node(id).is_some() {
            self.ancestor = Some(id);
        }
    }

    // --- Delegation to ops ---

    pub fn add_child(&mut self, parent_id: NodeId, child_id: NodeId) -> Result<(), TreeError> {
        ops::add_child(self, parent_id, child_id)
    }

    pub fn scale_branches(&mut self, alpha: f64) {
        ops::scale_branches(self, alpha)
    }

    pub fn classify_outgroups(&mut self) -> Result<(), TreeError> {
        ops::classify_outgroups(self)
    }

    pub fn reroot_at_ancestor(&mut self) -> Result<NodeId, TreeError> {
        ops::reroot_at_ancestor(self)
    }

    pub fn check_structure(&self) -> Result<(), TreeError> {
        ops::check_structure(self)
    }

    // --- Delegation to traversal ---

    pub fn preorder(&self, start_node: &NodeId) -> Vec<NodeId> {
        traversal::preorder(self, *start_node)
    }

    // --- Delegation to query ---

    pub fn get_path_from_root(&self, id: &NodeId) -> Result<Vec<NodeId>, TreeError> {
        query::get_path_from_root(self, id)
    }

    pub fn is_descendant(&self, id: &NodeId, ancestor: &NodeId) -> bool {
        query::is_descendant(self, id, ancestor)
    }

    pub fn get_node_by_name(&self, name: &str) -> Option<NodeId> {
        query::get_node_by_name(self, name)
    }

    pub fn get_leaves(&self) -> Vec<NodeId> {
        match self.root {
            Some(root) => query::get_leaves(self, root),
            None => Vec::new(),
        }
    }

    // --- Delegation to io ---

    pub fn from_file(infile: &str) -> anyhow::Result<Tree> {
        io::from_file(infile)
    }

    pub fn to_newick(&self) -> String {
        io::to_newick(self)
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    /// Panics on an ID that does not belong to this tree.
    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }
}
