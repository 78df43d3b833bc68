use crate::libs::adjacency::{Observations, SymbolSpace};
use crate::libs::error::InputError;
use crate::libs::genome::{ChromKind, Chromosome};
use crate::libs::phylo::Tree;
use indexmap::IndexMap;
use log::{debug, info, trace};

/// Knobs of one inference run
#[derive(Debug, Clone)]
pub struct InferOptions {
    /// Species whose block count fixes the symbol space
    pub reference: String,
    /// Multiplier turning branch lengths into substitution distances
    pub alpha: f64,
    /// Read outgroup adjacencies from join files instead of the genome file
    pub use_joins: bool,
}

/// Everything the engine reads: the rerooted tree with its leaf genomes and
/// the adjacencies observed over it.
#[derive(Debug, Clone)]
pub struct Context {
    pub tree: Tree,
    pub observations: Observations,
}

impl Context {
    /// Prepare a parsed tree for inference.
    ///
    /// Branches are scaled, leaves outside the designated ancestor's subtree are
    /// flagged as outgroups, and the tree is rerooted above the ancestor. Genomes
    /// are then attached to the leaves; with `use_joins`, outgroup adjacencies
    /// come from `load_joins(name)` instead.
    pub fn new<F>(
        mut tree: Tree,
        genomes: &IndexMap<String, Vec<Chromosome>>,
        opt: &InferOptions,
        mut load_joins: F,
    ) -> anyhow::Result<Self>
    where
        F: FnMut(&str) -> anyhow::Result<Vec<(i32, i32)>>,
    {
        if !opt.alpha.is_finite() || opt.alpha < 0.0 {
            return Err(InputError::Consistency(format!(
                "alpha must be a non-negative number, got {}",
                opt.alpha
            ))
            .into());
        }

        tree.scale_branches(opt.alpha);
        tree.classify_outgroups()?;
        let root = tree.reroot_at_ancestor()?;
        debug!("Rerooted at {}", tree[root].name_or_id());

        if tree.get_node_by_name(&opt.reference).is_none() {
            return Err(InputError::Consistency(format!(
                "reference species {} is not in the tree",
                opt.reference
            ))
            .into());
        }
        let blocks: usize = genomes
            .get(&opt.reference)
            .ok_or_else(|| {
                InputError::Consistency(format!(
                    "reference species {} has no genome",
                    opt.reference
                ))
            })?
            .iter()
            .map(|c| c.blocks.len())
            .sum();
        let space = SymbolSpace::new(blocks)?;
        info!("{} blocks in {}", blocks, opt.reference);

        let leaves = tree.get_leaves();
        let mut joined = Vec::new();
        for &leaf in &leaves {
            let node = &tree[leaf];
            let name = node
                .name
                .clone()
                .ok_or_else(|| InputError::Consistency(format!("leaf {} has no name", leaf)))?;
            let role = if node.outgroup { "outgroup" } else { "ingroup" };
            if opt.use_joins && node.outgroup {
                debug!("Initialising {} ({}) from joins", name, role);
                joined.push((leaf, name));
                continue;
            }
            let genome = genomes.get(&name).ok_or_else(|| {
                InputError::Consistency(format!("no genome for leaf {}", name))
            })?;
            if let Some(node) = tree.get_node_mut(leaf) {
                node.genome = genome.clone();
                let scaffolds = node
                    .genome
                    .iter()
                    .filter(|c| c.kind == ChromKind::Scaffold)
                    .count();
                debug!(
                    "Initialising {} ({}): {} chromosomes, {} scaffolds, {} blocks",
                    name,
                    role,
                    node.genome.len() - scaffolds,
                    scaffolds,
                    node.block_count()
                );
                for chrom in &node.genome {
                    trace!(
                        "  {}: {} blocks",
                        chrom.label.as_deref().unwrap_or("(unlabeled)"),
                        chrom.blocks.len()
                    );
                }
            }
        }
        for node in tree.nodes() {
            if node.distance < 0.0 || !node.distance.is_finite() {
                return Err(InputError::Consistency(format!(
                    "branch to {} has invalid length {}",
                    node.name_or_id(),
                    node.distance
                ))
                .into());
            }
        }

        let mut observations = Observations::from_tree(&tree, space)?;
        for (leaf, name) in joined {
            let joins = load_joins(&name)?;
            debug!("{} joins for outgroup {}", joins.len(), name);
            observations.add_joins(leaf, &joins)?;
        }

        let outgroups = leaves.iter().filter(|&&l| tree[l].outgroup).count();
        info!(
            "{} leaves ({} outgroups), {} distinct adjacencies",
            leaves.len(),
            outgroups,
            observations.global().len()
        );

        Ok(Self { tree, observations })
    }

    pub fn space(&self) -> &SymbolSpace {
        self.observations.space()
    }
}
