use crate::libs::adjacency::Symbol;
use std::collections::BTreeMap;

/// Which index selects the lane a value is stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Major {
    Row,
    Column,
}

/// Square matrix over symbol pairs holding only nonzero values.
///
/// Values are grouped in lanes (one per row or per column) so that row or
/// column sums only touch stored entries.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    major: Major,
    lanes: Vec<BTreeMap<Symbol, f64>>,
}

impl SparseMatrix {
    pub fn new(size: usize, major: Major) -> Self {
        Self {
            major,
            lanes: vec![BTreeMap::new(); size],
        }
    }

    fn key(&self, i: Symbol, j: Symbol) -> (Symbol, Symbol) {
        match self.major {
            Major::Row => (i, j),
            Major::Column => (j, i),
        }
    }

    pub fn get(&self, i: Symbol, j: Symbol) -> f64 {
        let (lane, pos) = self.key(i, j);
        self.lanes
            .get(lane)
            .and_then(|l| l.get(&pos))
            .copied()
            .unwrap_or(0.0)
    }

    /// Store a value; zero removes the entry
    pub fn set(&mut self, i: Symbol, j: Symbol, value: f64) {
        let (lane, pos) = self.key(i, j);
        if value == 0.0 {
            self.lanes[lane].remove(&pos);
        } else {
            self.lanes[lane].insert(pos, value);
        }
    }

    /// Entries of row `k` (row-major) or column `k` (column-major),
    /// keyed by the other index
    pub fn lane(&self, k: Symbol) -> &BTreeMap<Symbol, f64> {
        &self.lanes[k]
    }

    pub fn len(&self) -> usize {
        self.lanes.iter().map(|l| l.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.iter().all(|l| l.is_empty())
    }

    /// All stored `(i, j, value)` triples, lane by lane
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, Symbol, f64)> + '_ {
        let major = self.major;
        self.lanes.iter().enumerate().flat_map(move |(k, lane)| {
            lane.iter().map(move |(&pos, &v)| match major {
                Major::Row => (k, pos, v),
                Major::Column => (pos, k, v),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_major() {
        let mut m = SparseMatrix::new(5, Major::Column);
        m.set(1, 3, 0.5);
        m.set(2, 3, 0.25);
        m.set(4, 0, 1.0);

        assert_eq!(m.get(1, 3), 0.5);
        assert_eq!(m.get(3, 1), 0.0);
        assert_eq!(m.len(), 3);
        assert_eq!(m.lane(3).values().sum::<f64>(), 0.75);

        let all: Vec<_> = m.iter().collect();
        assert_eq!(all, vec![(4, 0, 1.0), (1, 3, 0.5), (2, 3, 0.25)]);

        m.set(1, 3, 0.0);
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn test_row_major() {
        let mut m = SparseMatrix::new(4, Major::Row);
        m.set(2, 1, 0.1);
        m.set(2, 3, 0.2);
        assert_eq!(m.lane(2).len(), 2);
        assert_eq!(m.get(2, 3), 0.2);
        assert!(m.lane(1).is_empty());
        assert!(!m.is_empty());
    }
}
