use crate::libs::error::InputError;

/// Dense index of a block end, or of one of the two artificial chromosome ends.
pub type Symbol = usize;

/// Maps signed block IDs into `0..=2T+1`.
///
/// * `0` is the artificial start `A`
/// * `1..=T` are blocks read forward
/// * `T+1..=2T` are the same blocks read in reverse
/// * `2T+1` is the artificial end `Z`
///
/// An adjacency `(i, j)` on one strand is the adjacency `(mirror(j), mirror(i))`
/// on the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolSpace {
    t: usize,
}

impl SymbolSpace {
    pub fn new(t: usize) -> Result<Self, InputError> {
        if t == 0 {
            return Err(InputError::Consistency(
                "total number of blocks is zero".to_string(),
            ));
        }
        if t > (i32::MAX as usize) / 2 {
            return Err(InputError::Capacity(format!("{} blocks", t)));
        }
        Ok(Self { t })
    }

    /// Number of distinct ancestral blocks, `T`
    pub fn blocks(&self) -> usize {
        self.t
    }

    /// Symbol `A`
    pub fn start(&self) -> Symbol {
        0
    }

    /// Symbol `Z`
    pub fn end(&self) -> Symbol {
        2 * self.t + 1
    }

    /// Number of symbols, `2T + 2`
    pub fn size(&self) -> usize {
        2 * self.t + 2
    }

    pub fn is_artificial(&self, x: Symbol) -> bool {
        x == self.start() || x == self.end()
    }

    /// Same block end seen from the other strand
    ///
    /// ```
    /// use deschrambler::libs::adjacency::SymbolSpace;
    ///
    /// let space = SymbolSpace::new(3).unwrap();
    /// assert_eq!(space.mirror(0), 7);
    /// assert_eq!(space.mirror(7), 0);
    /// assert_eq!(space.mirror(2), 5);
    /// assert_eq!(space.mirror(5), 2);
    /// ```
    pub fn mirror(&self, x: Symbol) -> Symbol {
        if x == self.start() {
            self.end()
        } else if x == self.end() {
            self.start()
        } else if x <= self.t {
            x + self.t
        } else {
            x - self.t
        }
    }

    /// Symbol of a signed block ID
    pub fn block(&self, id: i32) -> Result<Symbol, InputError> {
        let abs = id.unsigned_abs() as usize;
        if id == 0 || abs > self.t {
            return Err(InputError::Consistency(format!(
                "block ID {} outside 1..={}",
                id, self.t
            )));
        }
        Ok(if id > 0 { abs } else { abs + self.t })
    }

    /// Signed block ID of a symbol, `0` for both artificial ends
    pub fn signed(&self, x: Symbol) -> i32 {
        if self.is_artificial(x) {
            0
        } else if x <= self.t {
            x as i32
        } else {
            -((x - self.t) as i32)
        }
    }
}
