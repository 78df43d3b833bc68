use super::context::Context;
use super::model::TransitionModel;
use super::sparse::{Major, SparseMatrix};
use crate::libs::adjacency::{Observations, Presence, Symbol, SymbolSpace};
use crate::libs::error::InputError;
use crate::libs::phylo::{NodeId, Tree};
use fxhash::FxHashMap;
use log::debug;
use std::io::Write;

/// Bottom-up likelihood of ancestral adjacencies.
///
/// `likelihood(node, i, j)` is the probability of the leaf observations below
/// `node` given that `i` precedes `j` at `node`. Values are memoized per node
/// and symbol pair, transition probabilities per node and same/different flag.
pub struct Engine<'a> {
    tree: &'a Tree,
    obs: &'a Observations,
    model: TransitionModel,
    lp_cache: FxHashMap<(NodeId, bool), f64>,
    ll_cache: FxHashMap<(NodeId, Symbol, Symbol), f64>,
}

impl<'a> Engine<'a> {
    pub fn new(ctx: &'a Context) -> Result<Self, InputError> {
        Ok(Self {
            tree: &ctx.tree,
            obs: &ctx.observations,
            model: TransitionModel::new(ctx.space().blocks())?,
            lp_cache: FxHashMap::default(),
            ll_cache: FxHashMap::default(),
        })
    }

    /// Probability that the neighbour on the branch above `node` stays the same
    /// (`same`) or changes to one particular other symbol.
    pub fn transition(&mut self, node: NodeId, same: bool) -> f64 {
        let model = self.model;
        let t = self.tree[node].distance;
        *self
            .lp_cache
            .entry((node, same))
            .or_insert_with(|| model.prob(t, same))
    }

    pub fn likelihood(&mut self, node: NodeId, i: Symbol, j: Symbol) -> f64 {
        if let Some(&v) = self.ll_cache.get(&(node, i, j)) {
            return v;
        }

        let tree = self.tree;
        let obs = self.obs;
        let current = &tree[node];

        let value = if current.is_leaf() {
            obs.leaf(node).map(|l| l.indicator(i, j)).unwrap_or(1.0)
        } else {
            // A unary node (the old root after rerooting) has one factor
            let mut value = 1.0;
            for &child in &current.children {
                let mut sum = 0.0;
                for &s in obs.global().column(j) {
                    sum += self.transition(child, i == s) * self.likelihood(child, s, j);
                }
                value *= sum;
            }
            value
        };

        self.ll_cache.insert((node, i, j), value);
        value
    }

    /// Likelihood at the root of every observed pair, column-major.
    pub fn predecessor(&mut self) -> Result<SparseMatrix, InputError> {
        let root = self
            .tree
            .get_root()
            .ok_or_else(|| InputError::Consistency("tree has no root".to_string()))?;
        let obs = self.obs;
        let space = *obs.space();
        let global = obs.global();

        let mut plh = SparseMatrix::new(space.size(), Major::Column);
        for j in 1..space.end() {
            for &i in global.column(j) {
                let v = self.likelihood(root, i, j);
                if v > 0.0 {
                    plh.set(i, j, v);
                }
            }
        }
        debug!(
            "{} nonzero predecessor likelihoods, {} cached node values",
            plh.len(),
            self.ll_cache.len()
        );

        Ok(plh)
    }

    pub fn run(&mut self) -> Result<Posteriors, InputError> {
        let space = *self.obs.space();
        let plh = self.predecessor()?;
        let slh = successor(&space, &plh);
        let (ppp, spp) = normalize(&space, self.obs.global(), &plh, &slh)?;

        Ok(Posteriors {
            space,
            pairs: self.obs.global().pairs(),
            plh,
            slh,
            ppp,
            spp,
        })
    }
}

/// Successor likelihoods, row-major: `i` followed by `j` on one strand is
/// `mirror(j)` followed by `mirror(i)` on the other. The mirror of the
/// artificial start is the artificial end, so `(A, x)` lands on `(mirror(x), Z)`.
pub fn successor(space: &SymbolSpace, plh: &SparseMatrix) -> SparseMatrix {
    let mut slh = SparseMatrix::new(space.size(), Major::Row);
    for (i, j, v) in plh.iter() {
        slh.set(space.mirror(j), space.mirror(i), v);
    }
    slh
}

/// Normalize predecessor likelihoods per column and successor likelihoods per
/// row, over the block symbols.
///
/// Pairs touching an artificial symbol are only normalized on one side; their
/// other side is copied across.
pub fn normalize(
    space: &SymbolSpace,
    global: &Presence,
    plh: &SparseMatrix,
    slh: &SparseMatrix,
) -> Result<(SparseMatrix, SparseMatrix), InputError> {
    let size = space.size();
    let (start, end) = (space.start(), space.end());

    let mut ppp = SparseMatrix::new(size, Major::Column);
    for j in 1..end {
        if global.column(j).is_empty() {
            continue;
        }
        let lane = plh.lane(j);
        let sum = lane_sum(space, j, lane.values().fold(0.0, |a, b| a + b), "predecessors")?;
        for (&i, &v) in lane {
            ppp.set(i, j, v / sum);
        }
    }

    let mut spp = SparseMatrix::new(size, Major::Row);
    for i in 1..end {
        if global.column(space.mirror(i)).is_empty() {
            continue;
        }
        let lane = slh.lane(i);
        let sum = lane_sum(space, i, lane.values().fold(0.0, |a, b| a + b), "successors")?;
        for (&j, &v) in lane {
            spp.set(i, j, v / sum);
        }
    }

    for x in 1..end {
        if global.contains(start, x) {
            spp.set(start, x, ppp.get(start, x));
        }
        if global.contains(x, end) {
            ppp.set(x, end, spp.get(x, end));
        }
    }

    Ok((ppp, spp))
}

fn lane_sum(space: &SymbolSpace, x: Symbol, sum: f64, what: &str) -> Result<f64, InputError> {
    if sum > 0.0 && sum.is_finite() {
        Ok(sum)
    } else {
        Err(InputError::Consistency(format!(
            "likelihoods of the {} of block end {} sum to {}",
            what,
            space.signed(x),
            sum
        )))
    }
}

/// One line of the result: `first` followed by `second`, `0` for a
/// chromosome end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjacency {
    pub first: i32,
    pub second: i32,
    pub prob: f64,
}

/// Likelihood tables of one run and the posteriors derived from them
#[derive(Debug, Clone)]
pub struct Posteriors {
    pub space: SymbolSpace,
    pairs: Vec<(Symbol, Symbol)>,
    pub plh: SparseMatrix,
    pub slh: SparseMatrix,
    pub ppp: SparseMatrix,
    pub spp: SparseMatrix,
}

impl Posteriors {
    /// Posterior of each observed pair, the product of its predecessor and
    /// successor posteriors, ordered by symbol.
    pub fn adjacencies(&self) -> Vec<Adjacency> {
        self.pairs
            .iter()
            .filter(|&&(i, j)| !(self.space.is_artificial(i) && self.space.is_artificial(j)))
            .map(|&(i, j)| Adjacency {
                first: self.space.signed(i),
                second: self.space.signed(j),
                prob: self.ppp.get(i, j) * self.spp.get(i, j),
            })
            .collect()
    }

    /// Write the `#T` header and one tab-separated line per adjacency
    pub fn write<W: Write + ?Sized>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "#{}", self.space.blocks())?;
        for adj in self.adjacencies() {
            writeln!(writer, "{}\t{}\t{:e}", adj.first, adj.second, adj.prob)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::genome::read_genomes;
    use crate::libs::likelihood::InferOptions;
    use approx::assert_relative_eq;

    const QUARTET: &str = "((A:0.1,B:0.1)@ANC:0.05,(C:0.1,D:0.1):0.05);";

    fn context(newick: &str, genomes: &str) -> Context {
        let tree = Tree::from_newick(newick).unwrap();
        let genomes = read_genomes(genomes.as_bytes()).unwrap();
        let opt = InferOptions {
            reference: "A".to_string(),
            alpha: 1.0,
            use_joins: false,
        };
        Context::new(tree, &genomes, &opt, |_: &str| Ok(vec![])).unwrap()
    }

    fn posteriors(ctx: &Context) -> Posteriors {
        Engine::new(ctx).unwrap().run().unwrap()
    }

    fn prob(adjs: &[Adjacency], first: i32, second: i32) -> f64 {
        adjs.iter()
            .find(|a| a.first == first && a.second == second)
            .map(|a| a.prob)
            .unwrap()
    }

    #[test]
    fn test_identical_genomes() {
        let ctx = context(
            "((A:0.1,B:0.1)@ANC:0.05,C:0.15);",
            ">A 1\n1 2 3 $\n>B 1\n1 2 3 $\n>C 1\n1 2 3 $\n",
        );
        let adjs = posteriors(&ctx).adjacencies();

        assert_eq!(adjs.len(), 8);
        for adj in &adjs {
            assert_relative_eq!(adj.prob, 1.0, epsilon = 1e-12);
        }
        let pairs: Vec<(i32, i32)> = adjs.iter().map(|a| (a.first, a.second)).collect();
        assert_eq!(
            pairs,
            vec![
                (0, 1),
                (0, -3),
                (1, 2),
                (2, 3),
                (3, 0),
                (-1, 0),
                (-2, -1),
                (-3, -2)
            ]
        );
    }

    #[test]
    fn test_one_rearranged_outgroup() {
        let ctx = context(
            QUARTET,
            ">A 1\n1 2 3 $\n>B 1\n1 2 3 $\n>C 1\n1 2 3 $\n>D 1\n1 3 2 $\n",
        );
        let adjs = posteriors(&ctx).adjacencies();
        assert_eq!(adjs.len(), 14);

        let kept = 0.9741345807939906;
        let lost = 0.00016945365117240334;
        assert_relative_eq!(prob(&adjs, 1, 2), kept, max_relative = 1e-9);
        assert_relative_eq!(prob(&adjs, 1, 3), lost, max_relative = 1e-9);
        assert_relative_eq!(prob(&adjs, 0, 1), 1.0, max_relative = 1e-9);
        assert_relative_eq!(prob(&adjs, 0, -3), kept, max_relative = 1e-9);
        assert_relative_eq!(prob(&adjs, 0, -2), lost, max_relative = 1e-9);
        assert_relative_eq!(prob(&adjs, 2, 0), lost, max_relative = 1e-9);
        assert_relative_eq!(prob(&adjs, -1, 0), 1.0, max_relative = 1e-9);

        // Both strands of an adjacency get the same posterior
        for adj in &adjs {
            let other = prob(&adjs, -adj.second, -adj.first);
            assert_relative_eq!(adj.prob, other, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_normalized_lanes() {
        let ctx = context(
            QUARTET,
            ">A 1\n1 2 3 $\n>B 1\n1 2 3 $\n>C 1\n1 2 3 $\n>D 1\n1 3 2 $\n",
        );
        let post = posteriors(&ctx);
        let end = post.space.end();

        for x in 1..end {
            let col: f64 = post.ppp.lane(x).values().sum();
            assert_relative_eq!(col, 1.0, epsilon = 1e-12);
            let row: f64 = post.spp.lane(x).values().sum();
            assert_relative_eq!(row, 1.0, epsilon = 1e-12);
        }

        // successor table mirrors the predecessor table
        for (i, j, v) in post.plh.iter() {
            let (mi, mj) = (post.space.mirror(i), post.space.mirror(j));
            assert_eq!(post.slh.get(mj, mi), v);
        }
    }

    #[test]
    fn test_untouched_column() {
        // D never shows block 3, so it does not constrain the predecessors of 3
        let genomes = ">A 1\n1 2 3 $\n>B 1\n1 3 2 $\n>C 1\n1 2 3 $\n";
        let ctx = context(QUARTET, &format!("{}>D 1\n1 2 $\n", genomes));
        let post = posteriors(&ctx);

        let col: Vec<(Symbol, f64)> = post.ppp.lane(3).iter().map(|(&i, &v)| (i, v)).collect();
        assert_eq!(col.len(), 2);
        assert_eq!(col[0].0, 1);
        assert_relative_eq!(col[0].1, 0.1798824969389694, max_relative = 1e-9);
        assert_eq!(col[1].0, 2);
        assert_relative_eq!(col[1].1, 0.8201175030610306, max_relative = 1e-9);

        let adjs = post.adjacencies();
        assert_relative_eq!(prob(&adjs, 1, 2), 0.7968909083632315, max_relative = 1e-9);
        assert_relative_eq!(prob(&adjs, 2, 3), 0.4100587515305153, max_relative = 1e-9);
        assert_relative_eq!(prob(&adjs, 0, -2), 0.25, max_relative = 1e-9);

        // Once 3 is placed on its own chromosome, D speaks for column 3
        let ctx = context(QUARTET, &format!("{}>D 2\n1 2 $\n3 $\n", genomes));
        let post = posteriors(&ctx);
        assert_eq!(post.ppp.lane(3).len(), 3);
        assert_relative_eq!(post.ppp.get(0, 3), 0.08129094395553584, max_relative = 1e-9);
        assert_relative_eq!(post.ppp.get(1, 3), 0.21087056673248325, max_relative = 1e-9);
        assert_relative_eq!(post.ppp.get(2, 3), 0.7078384893119809, max_relative = 1e-9);
        let adjs = post.adjacencies();
        assert_relative_eq!(prob(&adjs, 2, 3), 0.35391924465599045, max_relative = 1e-9);
    }

    #[test]
    fn test_unary_old_root() {
        // After rerooting at ANC the old root keeps one child
        let ctx = context(
            "(((A:0.1,B:0.1)@ANC:0.05,C:0.1):0.05,D:0.2);",
            ">A 1\n1 2 $\n>B 1\n1 2 $\n>C 1\n1 2 $\n>D 1\n2 1 $\n",
        );
        let mut engine = Engine::new(&ctx).unwrap();
        let post = engine.run().unwrap();
        let adjs = post.adjacencies();
        assert_relative_eq!(prob(&adjs, 1, 2), 0.9904953701964232, max_relative = 1e-9);
        assert_relative_eq!(prob(&adjs, 2, 1), 2.2692467413827806e-05, max_relative = 1e-9);
    }

    #[test]
    fn test_zero_sum() {
        let space = SymbolSpace::new(1).unwrap();
        let mut global = Presence::new(&space);
        global.insert(0, 1);
        let plh = SparseMatrix::new(space.size(), Major::Column);
        let slh = successor(&space, &plh);

        match normalize(&space, &global, &plh, &slh) {
            Err(InputError::Consistency(msg)) => {
                assert!(msg.ends_with("block end 1 sum to 0"), "{}", msg)
            }
            res => panic!("Expected Consistency error, got {:?}", res),
        }
    }

    #[test]
    fn test_write() {
        let ctx = context(
            "((A:0.1,B:0.1)@ANC:0.05,C:0.15);",
            ">A 1\n1 2 $\n>B 1\n1 2 $\n>C 1\n1 2 $\n",
        );
        let mut out = Vec::new();
        posteriors(&ctx).write(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "#2");
        assert_eq!(lines[1], "0\t1\t1e0");
        assert_eq!(lines.len(), 7);
    }
}
