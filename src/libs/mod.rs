pub mod adjacency;
pub mod apcf;
pub mod error;
pub mod genome;
pub mod io;
pub mod likelihood;
pub mod phylo;
