//! Posterior probabilities of ancestral adjacencies.
//!
//! Adjacency evidence from the leaves is propagated to the designated ancestor
//! under a symmetric continuous-time model over the `2T - 1` possible successors
//! of a block end, then normalized per block end on both strands.

pub mod context;
pub mod engine;
pub mod model;
pub mod sparse;

pub use context::{Context, InferOptions};
pub use engine::{Adjacency, Engine, Posteriors};
pub use model::TransitionModel;
pub use sparse::{Major, SparseMatrix};
