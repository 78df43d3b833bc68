use super::bits::BitVector;
use super::symbol::{Symbol, SymbolSpace};
use crate::libs::error::InputError;
use crate::libs::genome::Chromosome;
use crate::libs::phylo::{NodeId, Tree};
use fxhash::{FxHashMap, FxHashSet};

/// Symbol pairs that are adjacent in at least one leaf.
///
/// Pairs are kept per second symbol (column), sorted, so the engine can
/// enumerate every possible predecessor of a block end.
#[derive(Debug, Clone)]
pub struct Presence {
    columns: Vec<Vec<Symbol>>,
    count: usize,
}

impl Presence {
    pub fn new(space: &SymbolSpace) -> Self {
        Self {
            columns: vec![Vec::new(); space.size()],
            count: 0,
        }
    }

    pub fn insert(&mut self, i: Symbol, j: Symbol) {
        let column = &mut self.columns[j];
        if let Err(pos) = column.binary_search(&i) {
            column.insert(pos, i);
            self.count += 1;
        }
    }

    pub fn contains(&self, i: Symbol, j: Symbol) -> bool {
        self.columns
            .get(j)
            .map(|c| c.binary_search(&i).is_ok())
            .unwrap_or(false)
    }

    /// All first symbols paired with `j`, ascending
    pub fn column(&self, j: Symbol) -> &[Symbol] {
        self.columns.get(j).map(|c| c.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Every pair, ordered by first then second symbol
    pub fn pairs(&self) -> Vec<(Symbol, Symbol)> {
        let mut pairs: Vec<(Symbol, Symbol)> = self
            .columns
            .iter()
            .enumerate()
            .flat_map(|(j, col)| col.iter().map(move |&i| (i, j)))
            .collect();
        pairs.sort_unstable();
        pairs
    }
}

/// Adjacencies observed in one leaf.
///
/// `touched` records which second symbols have any observed predecessor in
/// this leaf. For an untouched column the leaf says nothing, so the engine treats
/// every pair in it as possible.
#[derive(Debug, Clone)]
pub struct LeafPresence {
    pairs: FxHashSet<(Symbol, Symbol)>,
    touched: BitVector,
}

impl LeafPresence {
    pub fn new(space: &SymbolSpace) -> Self {
        Self {
            pairs: FxHashSet::default(),
            touched: BitVector::new(space.size()),
        }
    }

    pub fn contains(&self, i: Symbol, j: Symbol) -> bool {
        self.pairs.contains(&(i, j))
    }

    pub fn is_touched(&self, j: Symbol) -> bool {
        self.touched.get(j)
    }

    /// Likelihood of the pair at this leaf: the 0/1 observation when the column
    /// was touched, 1 otherwise.
    pub fn indicator(&self, i: Symbol, j: Symbol) -> f64 {
        if !self.is_touched(j) || self.contains(i, j) {
            1.0
        } else {
            0.0
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Per-leaf and global adjacency observations over one symbol space.
#[derive(Debug, Clone)]
pub struct Observations {
    space: SymbolSpace,
    global: Presence,
    leaves: FxHashMap<NodeId, LeafPresence>,
}

impl Observations {
    pub fn new(space: SymbolSpace) -> Self {
        Self {
            global: Presence::new(&space),
            space,
            leaves: FxHashMap::default(),
        }
    }

    /// Record the block orders carried by every leaf of the tree.
    /// Leaves without a genome get an empty, fully unconstrained record.
    pub fn from_tree(tree: &Tree, space: SymbolSpace) -> Result<Self, InputError> {
        let mut obs = Self::new(space);
        for leaf in tree.get_leaves() {
            let node = tree.get_node(leaf).ok_or_else(|| {
                InputError::Consistency(format!("leaf {} missing from tree", leaf))
            })?;
            obs.add_genome(leaf, &node.genome)?;
        }
        Ok(obs)
    }

    pub fn space(&self) -> &SymbolSpace {
        &self.space
    }

    pub fn global(&self) -> &Presence {
        &self.global
    }

    pub fn leaf(&self, node: NodeId) -> Option<&LeafPresence> {
        self.leaves.get(&node)
    }

    /// Walk each chromosome, linking consecutive block ends and anchoring
    /// both termini to the artificial start and end symbols.
    pub fn add_genome(&mut self, node: NodeId, genome: &[Chromosome]) -> Result<(), InputError> {
        let space = self.space;
        let mut leaf = self
            .leaves
            .remove(&node)
            .unwrap_or_else(|| LeafPresence::new(&space));

        for chrom in genome {
            let symbols = chrom
                .blocks
                .iter()
                .map(|&b| space.block(b))
                .collect::<Result<Vec<_>, _>>()?;
            let (first, last) = match (symbols.first(), symbols.last()) {
                (Some(&f), Some(&l)) => (f, l),
                _ => continue,
            };

            self.link(&mut leaf, space.start(), first);
            for pair in symbols.windows(2) {
                self.link(&mut leaf, pair[0], pair[1]);
            }
            self.link(&mut leaf, last, space.end());
        }

        self.leaves.insert(node, leaf);
        Ok(())
    }

    /// Record `x y` join pairs, `0` standing for a chromosome end.
    pub fn add_joins(&mut self, node: NodeId, joins: &[(i32, i32)]) -> Result<(), InputError> {
        let space = self.space;
        let mut leaf = self
            .leaves
            .remove(&node)
            .unwrap_or_else(|| LeafPresence::new(&space));

        for &(x, y) in joins {
            let (i, j) = match (x, y) {
                (0, 0) => continue,
                (0, y) => (space.start(), space.block(y)?),
                (x, 0) => (space.block(x)?, space.end()),
                (x, y) => (space.block(x)?, space.block(y)?),
            };
            self.link(&mut leaf, i, j);
        }

        self.leaves.insert(node, leaf);
        Ok(())
    }

    // Both strands of the adjacency go into the leaf and the global set.
    fn link(&mut self, leaf: &mut LeafPresence, i: Symbol, j: Symbol) {
        let space = self.space;
        let (mi, mj) = (space.mirror(j), space.mirror(i));

        for (a, b) in [(i, j), (mi, mj)] {
            leaf.pairs.insert((a, b));
            self.global.insert(a, b);
        }

        if j != space.end() {
            leaf.touched.set(j);
        }
        if i != space.start() {
            leaf.touched.set(mj);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observe(blocks: Vec<i32>, t: usize) -> Observations {
        let space = SymbolSpace::new(t).unwrap();
        let mut obs = Observations::new(space);
        obs.add_genome(0, &[Chromosome::new(blocks)]).unwrap();
        obs
    }

    #[test]
    fn test_genome_adjacencies() {
        // T = 3: A=0, 1 2 3, -1=4 -2=5 -3=6, Z=7
        let obs = observe(vec![1, 2, 3], 3);
        let global = obs.global();

        let expected = vec![
            (0, 1),
            (0, 6),
            (1, 2),
            (2, 3),
            (3, 7),
            (4, 7),
            (5, 4),
            (6, 5),
        ];
        assert_eq!(global.pairs(), expected);
        assert_eq!(global.len(), 8);
        assert_eq!(global.column(7), &[3, 4]);

        let leaf = obs.leaf(0).unwrap();
        assert_eq!(leaf.len(), 8);
        for (i, j) in expected {
            assert!(leaf.contains(i, j));
        }
    }

    #[test]
    fn test_touched_columns() {
        // Block 3 never appears in this leaf
        let obs = observe(vec![1, -2], 3);
        let leaf = obs.leaf(0).unwrap();

        // (A,1) (1,-2) (-2,Z) plus mirrors (-1,Z) (2,-1) (A,2)
        for j in [1, 5, 4, 2] {
            assert!(leaf.is_touched(j), "symbol {}", j);
        }
        for j in [0, 3, 6, 7] {
            assert!(!leaf.is_touched(j), "symbol {}", j);
        }

        // touched and present / touched and absent / untouched
        assert_eq!(leaf.indicator(1, 5), 1.0);
        assert_eq!(leaf.indicator(2, 5), 0.0);
        assert_eq!(leaf.indicator(2, 3), 1.0);
    }

    #[test]
    fn test_joins_match_genome() {
        let space = SymbolSpace::new(3).unwrap();
        let mut joins = Observations::new(space);
        joins
            .add_joins(0, &[(0, 1), (1, -3), (-3, 2), (2, 0), (0, 0)])
            .unwrap();

        let genome = observe(vec![1, -3, 2], 3);
        assert_eq!(joins.global().pairs(), genome.global().pairs());
    }

    #[test]
    fn test_block_out_of_range() {
        let space = SymbolSpace::new(2).unwrap();
        let mut obs = Observations::new(space);
        let res = obs.add_genome(0, &[Chromosome::new(vec![1, 3])]);
        assert!(matches!(res, Err(InputError::Consistency(_))));
    }
}
