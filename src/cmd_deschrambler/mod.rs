//! Subcommand modules for the `deschrambler` binary.

pub mod assemble;
pub mod infer;
pub mod reroot;
