use super::Tree;
use crate::libs::phylo::error::TreeError;
use crate::libs::phylo::node::{NodeId, MAX_CHILDREN};

/// Name given to the node inserted above the designated ancestor
pub const SYNTHETIC_ROOT: &str = "NEWROOT";

/// Add a child to a parent node.
/// Updates both parent's `children` list and child's `parent` field.
pub fn add_child(tree: &mut Tree, parent_id: NodeId, child_id: NodeId) -> Result<(), TreeError> {
    // Validation
    if parent_id == child_id {
        return Err(TreeError::LogicError(
            "Cannot add node as child of itself".to_string(),
        ));
    }
    if tree.get_node(parent_id).is_none() {
        return Err(TreeError::LogicError(format!(
            "Parent node {} not found",
            parent_id
        )));
    }
    if tree.get_node(child_id).is_none() {
        return Err(TreeError::LogicError(format!(
            "Child node {} not found",
            child_id
        )));
    }

    // Check if child already has a parent
    if let Some(old_parent) = tree.nodes[child_id].parent {
        return Err(TreeError::LogicError(format!(
            "Node {} already has parent {}",
            child_id, old_parent
        )));
    }

    if tree.nodes[parent_id].children.len() >= MAX_CHILDREN {
        return Err(TreeError::LogicError(format!(
            "Node {} would have more than {} children",
            tree.nodes[parent_id].name_or_id(),
            MAX_CHILDREN
        )));
    }

    // Link
    tree.nodes[child_id].parent = Some(parent_id);
    tree.nodes[parent_id].children.push(child_id);

    Ok(())
}

/// Set every node's scaled distance to `length * alpha`.
/// Missing lengths count as zero.
pub fn scale_branches(tree: &mut Tree, alpha: f64) {
    for node in tree.nodes.iter_mut() {
        node.distance = node.length.unwrap_or(0.0) * alpha;
    }
}

/// Flag every leaf outside the designated ancestor's subtree as an outgroup.
///
/// Must run before `reroot_at_ancestor`, which moves the ancestor to the root.
pub fn classify_outgroups(tree: &mut Tree) -> Result<(), TreeError> {
    let ancestor = tree
        .get_ancestor()
        .ok_or_else(|| TreeError::LogicError("Tree has no root".to_string()))?;

    let leaves: Vec<NodeId> = tree
        .nodes
        .iter()
        .filter(|n| n.is_leaf())
        .map(|n| n.id)
        .collect();
    for leaf in leaves {
        let inside = tree.is_descendant(&leaf, &ancestor);
        tree.nodes[leaf].outgroup = !inside;
    }

    Ok(())
}

/// Reroot the tree in place so that the designated ancestor sits directly under a
/// new synthetic root.
///
/// Walking up from the ancestor's old parent to the old root, each edge is reversed:
/// the parent is detached from its child slot and re-attached as a child of the node
/// below it, taking over that node's branch length. A synthetic root is then inserted
/// with the ancestor (distance 0) and the re-hung remainder (the ancestor's old
/// distance) as its two children. The synthetic root becomes both the tree root and
/// the designated ancestor.
///
/// Returns the new root. A tree already rooted at its ancestor is left untouched.
pub fn reroot_at_ancestor(tree: &mut Tree) -> Result<NodeId, TreeError> {
    let old_root = tree
        .root
        .ok_or_else(|| TreeError::LogicError("Tree has no root".to_string()))?;
    let ancestor = tree.get_ancestor().unwrap_or(old_root);
    if ancestor == old_root {
        return Ok(old_root);
    }

    // path[0] is the old root, path[k] the ancestor
    let path = tree.get_path_from_root(&ancestor)?;
    let k = path.len() - 1;
    let lengths: Vec<(Option<f64>, f64)> = path
        .iter()
        .map(|&id| (tree.nodes[id].length, tree.nodes[id].distance))
        .collect();
    let below = path[k - 1];

    // 1. Cut the ancestor loose
    tree.nodes[below].children.retain(|&c| c != ancestor);
    tree.nodes[ancestor].parent = None;

    // 2. Reverse edges from the ancestor's old parent up to the old root.
    // path[i]'s length describes the edge (path[i-1] -> path[i])
    for i in (1..k).rev() {
        let child_id = path[i];
        let parent_id = path[i - 1];

        tree.nodes[parent_id].children.retain(|&x| x != child_id);
        tree.nodes[child_id].children.push(parent_id);

        let parent = &mut tree.nodes[parent_id];
        parent.parent = Some(child_id);
        parent.length = lengths[i].0;
        parent.distance = lengths[i].1;
    }
    tree.nodes[below].parent = None;

    // 3. Synthetic root above the ancestor
    let new_root = tree.add_node();
    tree.nodes[new_root].set_name(SYNTHETIC_ROOT);

    add_child(tree, new_root, ancestor)?;
    {
        let node = &mut tree.nodes[ancestor];
        node.length = Some(0.0);
        node.distance = 0.0;
    }

    add_child(tree, new_root, below)?;
    {
        let node = &mut tree.nodes[below];
        node.length = lengths[k].0;
        node.distance = lengths[k].1;
    }

    tree.root = Some(new_root);
    tree.ancestor = Some(new_root);

    check_structure(tree)?;

    Ok(new_root)
}

/// Verify arena links: a single root, mutual parent/child references,
/// at most two children per node, and every node reachable exactly once.
pub fn check_structure(tree: &Tree) -> Result<(), TreeError> {
    let root = tree
        .root
        .ok_or_else(|| TreeError::LogicError("Tree has no root".to_string()))?;

    let orphans: Vec<NodeId> = tree
        .nodes
        .iter()
        .filter(|n| n.parent.is_none())
        .map(|n| n.id)
        .collect();
    if orphans != vec![root] {
        return Err(TreeError::LogicError(format!(
            "Expected node {} as the only root, found {:?}",
            root, orphans
        )));
    }

    for node in &tree.nodes {
        if node.children.len() > MAX_CHILDREN {
            return Err(TreeError::LogicError(format!(
                "Node {} has {} children",
                node.name_or_id(),
                node.children.len()
            )));
        }
        for &child in &node.children {
            if tree.nodes.get(child).and_then(|c| c.parent) != Some(node.id) {
                return Err(TreeError::LogicError(format!(
                    "Child {} of node {} does not point back to it",
                    child,
                    node.name_or_id()
                )));
            }
        }
        if let Some(parent) = node.parent {
            let linked = tree
                .nodes
                .get(parent)
                .map(|p| p.children.contains(&node.id))
                .unwrap_or(false);
            if !linked {
                return Err(TreeError::LogicError(format!(
                    "Node {} is missing from its parent's children",
                    node.name_or_id()
                )));
            }
        }
    }

    // Cycle and reachability check
    let mut seen = vec![false; tree.nodes.len()];
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if seen[id] {
            return Err(TreeError::LogicError(format!(
                "Node {} reached twice",
                tree.nodes[id].name_or_id()
            )));
        }
        seen[id] = true;
        stack.extend(tree.nodes[id].children.iter().copied());
    }
    if let Some(lost) = seen.iter().position(|&s| !s) {
        return Err(TreeError::LogicError(format!(
            "Node {} is not reachable from the root",
            tree.nodes[lost].name_or_id()
        )));
    }

    Ok(())
}
