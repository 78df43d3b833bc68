//! Bit-packed boolean vector.

const WORD: usize = u64::BITS as usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitVector {
    len: usize,
    words: Vec<u64>,
}

impl BitVector {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            words: vec![0; len.div_ceil(WORD)],
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Out-of-range positions read as unset
    pub fn get(&self, pos: usize) -> bool {
        if pos >= self.len {
            return false;
        }
        (self.words[pos / WORD] >> (pos % WORD)) & 1 == 1
    }

    /// Returns whether the bit was previously unset
    pub fn set(&mut self, pos: usize) -> bool {
        assert!(pos < self.len, "bit {} out of range {}", pos, self.len);
        let word = &mut self.words[pos / WORD];
        let mask = 1u64 << (pos % WORD);
        let fresh = *word & mask == 0;
        *word |= mask;
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_vector() {
        let mut v = BitVector::new(130);
        assert_eq!(v.len(), 130);
        assert!(!v.get(129));
        assert!(v.set(129));
        assert!(!v.set(129));
        assert!(v.set(64));
        assert!(v.get(64) && v.get(129));
        assert!(!v.get(63) && !v.get(65));
        assert!(!v.get(1000));
    }
}
