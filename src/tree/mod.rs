//! Logical tree reconstruction from parent identifiers.

pub mod ancestry;
pub mod resolver;
pub mod shard;

pub use ancestry::{find_root_parent, resolve_ancestry, Ancestor, Ancestry};
pub use resolver::{
    find_all_records, resolve_records, resolve_records_deep, ResolveIssue, ResolvedFile,
    SpaceMapping, SpaceResolution, TreeResolver,
};
pub use shard::{shard, shard_string};
