use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strand {
    Minus,
    Plus,
}

impl Strand {
    pub fn flip(self) -> Self {
        match self {
            Strand::Minus => Strand::Plus,
            Strand::Plus => Strand::Minus,
        }
    }

    pub fn sign(self) -> i64 {
        match self {
            Strand::Minus => -1,
            Strand::Plus => 1,
        }
    }
}

/// One oriented block. Block `0` stands for a chromosome end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct End {
    pub block: u32,
    pub strand: Strand,
}

impl End {
    pub fn new(block: u32, strand: Strand) -> Self {
        Self { block, strand }
    }

    /// ```
    /// use deschrambler::libs::apcf::{End, Strand};
    ///
    /// assert_eq!(End::from_signed(-4), End::new(4, Strand::Minus));
    /// assert_eq!(End::from_signed(0), End::new(0, Strand::Plus));
    /// assert_eq!(End::from_signed(-4).signed(), -4);
    /// ```
    pub fn from_signed(id: i32) -> Self {
        let strand = if id < 0 { Strand::Minus } else { Strand::Plus };
        Self::new(id.unsigned_abs(), strand)
    }

    pub fn signed(&self) -> i64 {
        self.block as i64 * self.strand.sign()
    }

    pub fn flip(&self) -> Self {
        Self::new(self.block, self.strand.flip())
    }

    pub fn is_terminal(&self) -> bool {
        self.block == 0
    }

    /// Key of the block extremity left by an edge leaving this end
    pub fn out_key(&self) -> i64 {
        -self.signed()
    }

    /// Key of the block extremity taken by an edge entering this end
    pub fn in_key(&self) -> i64 {
        self.signed()
    }
}

impl fmt::Display for End {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.strand {
            Strand::Minus => '-',
            Strand::Plus => '+',
        };
        write!(f, "{}{}", self.block, sign)
    }
}

/// `from` immediately followed by `to` in the ancestor.
///
/// `score1` is the score read for this direction, `score2` the one read for
/// the opposite strand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: End,
    pub to: End,
    pub weight: f64,
    pub score1: f64,
    pub score2: f64,
}

impl Edge {
    pub fn new(from: End, to: End, weight: f64) -> Self {
        Self {
            from,
            to,
            weight,
            score1: weight,
            score2: weight,
        }
    }

    /// The same adjacency read on the other strand
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to.flip(),
            to: self.from.flip(),
            weight: self.weight,
            score1: self.score2,
            score2: self.score1,
        }
    }

    /// Block extremities this edge consumes; chromosome ends are never tracked.
    pub fn keys(&self) -> impl Iterator<Item = i64> {
        let from = (!self.from.is_terminal()).then(|| self.from.out_key());
        let to = (!self.to.is_terminal()).then(|| self.to.in_key());
        from.into_iter().chain(to)
    }
}
