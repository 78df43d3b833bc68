use super::edge::{Edge, End};
use super::path::{Insert, Path};
use crate::libs::error::InputError;
use fxhash::FxHashSet;
use itertools::Itertools;
use log::debug;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

/// Directed adjacency scores between oriented blocks.
///
/// A score read for `a b` also holds for `-b -a`, the same adjacency read on
/// the other strand.
#[derive(Debug, Clone, Default)]
pub struct ScoreTable {
    scores: BTreeMap<(End, End), f64>,
    n_blocks: u32,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, a: i32, b: i32, score: f64) {
        let (from, to) = (End::from_signed(a), End::from_signed(b));
        self.scores.insert((from, to), score);
        self.scores.insert((to.flip(), from.flip()), score);
        self.n_blocks = self.n_blocks.max(from.block).max(to.block);
    }

    /// Read `b1 b2 score` lines. Blank lines and `#` lines are skipped.
    pub fn read<R: BufRead>(reader: R) -> Result<Self, InputError> {
        let mut table = Self::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| InputError::Format(e.to_string()))?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let bad = || InputError::Format(format!("line {}: expected 'b1 b2 score', got: {}", idx + 1, line));
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 3 {
                return Err(bad());
            }
            let a: i32 = fields[0].parse().map_err(|_| bad())?;
            let b: i32 = fields[1].parse().map_err(|_| bad())?;
            let score: f64 = fields[2].parse().map_err(|_| bad())?;
            if !score.is_finite() {
                return Err(bad());
            }

            table.insert(a, b, score);
        }

        Ok(table)
    }

    /// Largest block ID seen
    pub fn n_blocks(&self) -> u32 {
        self.n_blocks
    }

    pub fn score(&self, from: End, to: End) -> Option<f64> {
        self.scores.get(&(from, to)).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Edges with a positive score between two different blocks, heaviest
    /// first. Equal weights keep the `(from, to)` order.
    pub fn candidates(&self) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self
            .scores
            .iter()
            .filter(|(&(from, to), &score)| score > 0.0 && from.block != to.block)
            .map(|(&(from, to), &score)| Edge {
                from,
                to,
                weight: score,
                score1: score,
                score2: self.score(to.flip(), from.flip()).unwrap_or(0.0),
            })
            .collect();
        edges.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        edges
    }
}

/// What happened to an offered edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Started(usize),
    Extended(usize),
    /// Extended path `into`, which then absorbed path `from`
    Merged { into: usize, from: usize },
    Cycle,
    Used,
    BelowMinimum,
}

/// Greedy path building state: open paths in creation order and the block
/// extremities already consumed.
#[derive(Debug, Clone)]
pub struct Assembler {
    min_weight: f64,
    paths: BTreeMap<usize, Path>,
    used: FxHashSet<i64>,
    next_id: usize,
}

impl Assembler {
    pub fn new(min_weight: f64) -> Self {
        Self {
            min_weight,
            paths: BTreeMap::new(),
            used: FxHashSet::default(),
            next_id: 0,
        }
    }

    /// Offer every candidate of `table`, heaviest first.
    pub fn run(table: &ScoreTable, min_weight: f64) -> Assembly {
        let mut assembler = Self::new(min_weight);
        let mut tally: BTreeMap<&str, usize> = BTreeMap::new();

        for edge in table.candidates() {
            let kind = match assembler.add(edge) {
                Outcome::Started(_) => "started",
                Outcome::Extended(_) => "extended",
                Outcome::Merged { .. } => "merged",
                Outcome::Cycle => "cycle",
                Outcome::Used => "used",
                Outcome::BelowMinimum => "below minimum",
            };
            *tally.entry(kind).or_default() += 1;
        }
        debug!("Edges offered: {:?}", tally);

        assembler.finish(table.n_blocks())
    }

    pub fn add(&mut self, edge: Edge) -> Outcome {
        if edge.weight < self.min_weight {
            return Outcome::BelowMinimum;
        }
        if edge.keys().any(|k| self.used.contains(&k)) {
            return Outcome::Used;
        }

        let mut extended = None;
        for (&id, path) in self.paths.iter_mut() {
            match path.insert(&edge) {
                Insert::Extended => {
                    extended = Some(id);
                    break;
                }
                Insert::Cycle => return Outcome::Cycle,
                Insert::NoMatch => {}
            }
        }
        self.used.extend(edge.keys());

        match extended {
            Some(id) => match self.merge_into(id) {
                Some(from) => Outcome::Merged { into: id, from },
                None => Outcome::Extended(id),
            },
            None => {
                let id = self.next_id;
                self.next_id += 1;
                self.paths.insert(id, Path::new(edge));
                Outcome::Started(id)
            }
        }
    }

    // Join the first other path that continues path `id`
    fn merge_into(&mut self, id: usize) -> Option<usize> {
        let mut path = self.paths.remove(&id)?;
        let merged = self
            .paths
            .iter()
            .find(|(_, other)| path.merge(other))
            .map(|(&other_id, _)| other_id);
        if let Some(other_id) = merged {
            self.paths.remove(&other_id);
        }
        self.paths.insert(id, path);
        merged
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.paths.values()
    }

    pub fn finish(self, n_blocks: u32) -> Assembly {
        Assembly {
            n_blocks,
            paths: self.paths.into_values().collect(),
        }
    }
}

/// Assembled fragments, in creation order
#[derive(Debug, Clone)]
pub struct Assembly {
    pub n_blocks: u32,
    pub paths: Vec<Path>,
}

impl Assembly {
    pub fn write_apcf<W: Write + ?Sized>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, ">ANCESTOR\t{}", self.n_blocks)?;
        for (k, path) in self.paths.iter().enumerate() {
            writeln!(writer, "# APCF {}", k + 1)?;
            writeln!(writer, "{} $", path.blocks().iter().join(" "))?;
        }
        Ok(())
    }

    pub fn write_joins<W: Write + ?Sized>(&self, writer: &mut W) -> std::io::Result<()> {
        for edge in self.paths.iter().flat_map(|p| p.edges()) {
            writeln!(
                writer,
                "{}\t{}\t{}",
                edge.from.signed(),
                edge.to.signed(),
                edge.weight
            )?;
        }
        Ok(())
    }

    pub fn edge_count(&self) -> usize {
        self.paths.iter().map(|p| p.len()).sum()
    }
}
