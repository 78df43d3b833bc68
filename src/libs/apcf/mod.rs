//! Greedy assembly of ancestral contiguous fragments (APCFs).
//!
//! Directed adjacency scores between oriented blocks are taken in descending
//! order and chained into paths. Each oriented block end is consumed at most
//! once and no path is ever closed into a cycle.

pub mod builder;
pub mod edge;
pub mod path;

pub use builder::{Assembler, Assembly, Outcome, ScoreTable};
pub use edge::{Edge, End, Strand};
pub use path::{Insert, Path};
