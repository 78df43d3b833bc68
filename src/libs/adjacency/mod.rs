//! Encoding of block ends as dense symbols, and the adjacencies observed between them.

pub mod bits;
pub mod presence;
pub mod symbol;

pub use bits::BitVector;
pub use presence::{LeafPresence, Observations, Presence};
pub use symbol::{Symbol, SymbolSpace};
