//! Full ancestor-chain resolution
//!
//! Follows `parentid` hop by hop until the space root is reached. Unlike the
//! one-hop lookup in [`crate::tree::resolver`], this yields every ancestor, so
//! the logical path of a deeply nested node is complete.

use crate::error::StoreError;
use crate::store::{locate_id, Record, SpaceDir};
use crate::types::{Identifier, NOT_AVAILABLE, RECORD_EXTENSION};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Upper bound on parent hops before a chain is considered cyclic.
pub const MAX_ANCESTRY_DEPTH: usize = 1024;

/// One node on the way from a record up to its space root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ancestor {
    pub id: Identifier,
    pub name: String,
    pub blob_id: Identifier,
    pub record: PathBuf,
}

/// Ancestors of a record, ordered from the node directly below the space root
/// down to the record's parent. Empty when the record sits at the space root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ancestry {
    pub chain: Vec<Ancestor>,
}

impl Ancestry {
    /// `.` for top-level records, otherwise `./a/b/...`.
    pub fn logical_parent_path(&self) -> String {
        if self.chain.is_empty() {
            return ".".to_string();
        }
        let names: Vec<&str> = self.chain.iter().map(|a| a.name.as_str()).collect();
        format!("./{}", names.join("/"))
    }

    pub fn depth(&self) -> usize {
        self.chain.len()
    }
}

/// Walk `parentid` links from `record` to the space root.
///
/// Fails with `DanglingParent` when a parent id is missing or has no record,
/// and with `CyclicParent` when an id repeats or the walk exceeds
/// [`MAX_ANCESTRY_DEPTH`] hops.
pub fn resolve_ancestry(space: &SpaceDir, record: &Record) -> Result<Ancestry, StoreError> {
    let mut chain = Vec::new();
    let mut visited: HashSet<Identifier> = HashSet::new();
    let mut current = record.parent_id()?;

    while current != space.space_id {
        if current.is_sentinel() {
            return Err(StoreError::DanglingParent {
                record: record.path().to_path_buf(),
                parent_id: NOT_AVAILABLE.to_string(),
            });
        }
        if chain.len() >= MAX_ANCESTRY_DEPTH || !visited.insert(current.clone()) {
            return Err(StoreError::CyclicParent {
                record: record.path().to_path_buf(),
                space_id: space.space_id.to_string(),
                last_id: current.to_string(),
            });
        }

        let handle = locate_id(&space.nodes_dir, current.as_str()).map_err(|e| match e {
            StoreError::RecordNotFound(_) => StoreError::DanglingParent {
                record: record.path().to_path_buf(),
                parent_id: current.to_string(),
            },
            other => other,
        })?;
        let parent = Record::decode(&handle)?;
        let next = parent.parent_id()?;
        chain.push(Ancestor {
            id: current,
            name: parent.name()?,
            blob_id: parent.blob_id()?,
            record: handle.path().to_path_buf(),
        });
        current = next;
    }

    chain.reverse();
    Ok(Ancestry { chain })
}

/// The top-level ancestor of `record`: the node directly below the space
/// root on its chain, or the record itself when its parent is the root.
pub fn find_root_parent(space: &SpaceDir, record: &Record) -> Result<Ancestor, StoreError> {
    let ancestry = resolve_ancestry(space, record)?;
    match ancestry.chain.into_iter().next() {
        Some(top) => Ok(top),
        None => Ok(Ancestor {
            id: record_id(&space.nodes_dir, record.path())
                .unwrap_or_else(|| Identifier::from(NOT_AVAILABLE)),
            name: record.name()?,
            blob_id: record.blob_id()?,
            record: record.path().to_path_buf(),
        }),
    }
}

/// Recover a node identifier from its record path under `nodes_dir`:
/// `<nodes>/12/34/56/78/90ab.mpk` → `1234567890ab`. Timestamped record names
/// keep only the part before the first `.`.
pub fn record_id(nodes_dir: &Path, record_path: &Path) -> Option<Identifier> {
    let relative = record_path.strip_prefix(nodes_dir).ok()?;
    let mut id = String::new();
    let mut components = relative.components().peekable();
    while let Some(component) = components.next() {
        let Component::Normal(part) = component else {
            return None;
        };
        let part = part.to_str()?;
        if components.peek().is_some() {
            id.push_str(part);
        } else {
            let stem = part
                .strip_suffix(&format!(".{}", RECORD_EXTENSION))
                .unwrap_or(part);
            id.push_str(stem.split('.').next().unwrap_or(stem));
        }
    }
    if id.is_empty() {
        None
    } else {
        Some(Identifier::new(id))
    }
}
