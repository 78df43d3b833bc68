use super::Tree;
use crate::libs::phylo::node::NodeId;
use std::io::Read;

/// Read the first Newick tree from a file.
///
/// # Arguments
/// * `infile` - Path to the input file (or "stdin" for stdin).
pub fn from_file(infile: &str) -> anyhow::Result<Tree> {
    let mut reader = crate::reader(infile)?;
    let mut newick = String::new();
    reader
        .read_to_string(&mut newick)
        .map_err(|e| anyhow::anyhow!("Read error in {}: {}", infile, e))?;

    if newick.trim().is_empty() {
        anyhow::bail!("No tree found in {}", infile);
    }

    // Anything after the first tree is ignored
    Ok(Tree::from_newick(&newick)?)
}

/// Serialize tree to Newick string.
/// The designated ancestor is written with the `@` marker, outgroup leaves
/// carry an `outgroup=1` NHX tag.
pub fn to_newick(tree: &Tree) -> String {
    if let Some(root) = tree.get_root() {
        let mut s = to_newick_recursive(tree, root);
        s.push(';');
        s
    } else {
        ";".to_string()
    }
}

fn to_newick_recursive(tree: &Tree, node_id: NodeId) -> String {
    let node = &tree.nodes[node_id];

    // Format node info: Label + Length + Comment
    let mut node_info = String::new();

    if !node.is_leaf() && tree.ancestor == Some(node_id) {
        node_info.push('@');
    }

    if let Some(name) = &node.name {
        node_info.push_str(&quote_label(name));
    }

    if let Some(len) = node.length {
        node_info.push_str(&format!(":{}", len));
    }

    let mut props = node.properties.clone().unwrap_or_default();
    if node.outgroup {
        props.insert("outgroup".to_string(), "1".to_string());
    }
    if !props.is_empty() {
        node_info.push_str("[&&NHX");
        for (k, v) in &props {
            if v.is_empty() {
                node_info.push_str(&format!(":{}", k));
            } else {
                node_info.push_str(&format!(":{}={}", k, v));
            }
        }
        node_info.push(']');
    }

    if node.children.is_empty() {
        node_info
    } else {
        let children_strs: Vec<String> = node
            .children
            .iter()
            .map(|&child| to_newick_recursive(tree, child))
            .collect();
        format!("({}){}", children_strs.join(","), node_info)
    }
}

fn quote_label(label: &str) -> String {
    let needs_quote = label.chars().any(|c| "(),:;[]@ \t\n".contains(c));
    if needs_quote {
        format!("'{}'", label)
    } else {
        label.to_string()
    }
}
