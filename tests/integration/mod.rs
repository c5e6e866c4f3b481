//! Integration tests for store resolution, symlink repair, and the CLI

mod cli_parse;
mod support;
mod symlink_repair;
mod tree_resolution;
