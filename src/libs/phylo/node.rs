use crate::libs::genome::Chromosome;
use std::collections::BTreeMap;

/// NodeId is an index into the Tree's node vector.
/// It is lightweight (Copy) and safe (no pointers).
pub type NodeId = usize;

/// At most two children per node; the engine never handles polytomies.
pub const MAX_CHILDREN: usize = 2;

#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier for the node (index in the arena)
    pub id: NodeId,

    /// Parent node ID (None for root)
    pub parent: Option<NodeId>,

    /// List of child node IDs, never more than `MAX_CHILDREN`
    pub children: Vec<NodeId>,

    // --- Payload ---

    /// Species or ancestor label. Unnamed nodes get `IN<k>` while parsing.
    pub name: Option<String>,

    /// Branch length to parent, as written in the tree file
    pub length: Option<f64>,

    /// Branch length scaled by the model rate (`length * alpha`).
    /// This is the `t` of the transition probabilities.
    pub distance: f64,

    /// Leaf lies outside the subtree of the designated ancestor
    pub outgroup: bool,

    /// Block orders of an extant genome; empty for internal nodes
    /// and for outgroups read from join files.
    pub genome: Vec<Chromosome>,

    /// Structured properties from `[&&NHX:...]` comments
    pub properties: Option<BTreeMap<String, String>>,
}

impl Node {
    /// Create a new empty node with a specific ID
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            name: None,
            length: None,
            distance: 0.0,
            outgroup: false,
            genome: Vec::new(),
            properties: None,
        }
    }

    /// Set the name of the node
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn name_or_id(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("#{}", self.id),
        }
    }

    /// Check if the node is a leaf (no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Total number of blocks over all chromosomes
    pub fn block_count(&self) -> usize {
        self.genome.iter().map(|c| c.blocks.len()).sum()
    }
}
