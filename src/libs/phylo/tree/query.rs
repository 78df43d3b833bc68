use super::Tree;
use crate::libs::phylo::error::TreeError;
use crate::libs::phylo::node::NodeId;

/// Node IDs from the root down to `id`, both included.
pub fn get_path_from_root(tree: &Tree, id: &NodeId) -> Result<Vec<NodeId>, TreeError> {
    let mut path = Vec::new();
    let mut current = *id;

    if tree.get_node(current).is_none() {
        return Err(TreeError::LogicError(format!("Node {} not found", current)));
    }

    loop {
        path.push(current);
        if path.len() > tree.nodes.len() {
            return Err(TreeError::LogicError(format!(
                "Parent links of node {} form a cycle",
                id
            )));
        }
        match tree.nodes[current].parent {
            Some(p) => current = p,
            None => break,
        }
    }

    path.reverse();
    if tree.root != Some(path[0]) {
        return Err(TreeError::LogicError(format!(
            "Node {} is detached from root",
            id
        )));
    }

    Ok(path)
}

/// Whether `ancestor` lies on the path from `id` to the root (`id` itself included).
pub fn is_descendant(tree: &Tree, id: &NodeId, ancestor: &NodeId) -> bool {
    let mut current = Some(*id);
    let mut steps = 0;
    while let Some(c) = current {
        if c == *ancestor {
            return true;
        }
        steps += 1;
        if steps > tree.nodes.len() {
            return false;
        }
        current = tree.get_node(c).and_then(|n| n.parent);
    }
    false
}

/// First node with the given name, in arena order.
pub fn get_node_by_name(tree: &Tree, name: &str) -> Option<NodeId> {
    tree.nodes
        .iter()
        .find(|n| n.name.as_deref() == Some(name))
        .map(|n| n.id)
}

/// Get IDs of all leaves in subtree rooted at `id`, left to right.
pub fn get_leaves(tree: &Tree, id: NodeId) -> Vec<NodeId> {
    super::traversal::preorder(tree, id)
        .into_iter()
        .filter(|&n| tree.nodes[n].is_leaf())
        .collect()
}
