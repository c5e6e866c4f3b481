//! Treemend: symlink tree inspection and repair for sharded metadata stores
//!
//! Nodes are stored flat under hash-sharded paths and point to their parent
//! by identifier. This crate locates and decodes those records, rebuilds the
//! logical tree, and checks (or repairs) the parallel symlink tree that makes
//! the hierarchy browsable.

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod logging;
pub mod store;
pub mod symlink;
pub mod tooling;
pub mod tree;
pub mod types;

#[cfg(test)]
mod test_support;
