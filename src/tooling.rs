//! Tooling
//!
//! Command-line surface over the store, tree, and symlink layers.

pub mod cli;
pub mod dump;
pub mod format;
pub mod view;

pub use cli::{Cli, CliContext, Commands};
pub use dump::{dump_store, DumpOptions, DumpReport};
