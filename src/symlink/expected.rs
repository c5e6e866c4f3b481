//! Expected symlink location and target arithmetic
//!
//! A node's link lives at `<nodes>/<parent-shard>/<name>` and points back to
//! the node's own shard directory through a relative path. The location is
//! derived by climbing from the record's storage directory to the `nodes`
//! root: five levels from a directory node's own subdirectory, four from the
//! shard directory that holds a file node.

use crate::error::StoreError;
use crate::tree::shard::shard;
use crate::types::NodeKind;
use std::path::{Component, Path, PathBuf};

/// Levels between a directory node's own subdirectory and the `nodes` root.
pub const DIRECTORY_DEPTH: usize = 5;
/// Levels between the shard directory holding a file node and the `nodes` root.
pub const FILE_DEPTH: usize = 4;

/// Where a node's symlink should be and what it should contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedLink {
    pub location: PathBuf,
    pub target: PathBuf,
}

impl ExpectedLink {
    pub fn compute(
        kind: NodeKind,
        record_dir: &Path,
        parent_id: &str,
        name: &str,
    ) -> Result<Self, StoreError> {
        let location = symlink_location(kind, record_dir, parent_id, name)?;
        let target = relative_target(record_dir, &location);
        Ok(ExpectedLink { location, target })
    }
}

/// Absolute, lexically normalized location of the symlink for a node.
pub fn symlink_location(
    kind: NodeKind,
    record_dir: &Path,
    parent_id: &str,
    name: &str,
) -> Result<PathBuf, StoreError> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(StoreError::conflict(
            record_dir,
            format!("name {:?} cannot be a link name", name),
        ));
    }

    let (anchor, depth) = match kind {
        NodeKind::Directory if !record_dir.is_file() => (record_dir, DIRECTORY_DEPTH),
        NodeKind::Directory | NodeKind::File => (
            record_dir.parent().unwrap_or(record_dir),
            FILE_DEPTH,
        ),
        NodeKind::Unknown => {
            return Err(StoreError::conflict(
                record_dir,
                "node type is neither file nor directory",
            ))
        }
    };

    let mut location = anchor.to_path_buf();
    for _ in 0..depth {
        location.push("..");
    }
    location.push(shard(parent_id)?);
    location.push(name);
    Ok(normalize(&location))
}

/// Relative path from the link location back to `record_dir`.
///
/// Computed as the path from `location` (treated as a directory) to
/// `record_dir`, minus its first `..`: the link is resolved from its
/// containing directory, one level above `location` itself.
pub fn relative_target(record_dir: &Path, location: &Path) -> PathBuf {
    let relative = relative_path(location, record_dir);
    let mut components = relative.components();
    let mut stripped = PathBuf::new();
    match components.next() {
        Some(Component::ParentDir) | None => {}
        Some(first) => stripped.push(first),
    }
    stripped.extend(components);
    if stripped.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        stripped
    }
}

/// Lexical relative path from directory `start` to `dest`.
pub fn relative_path(start: &Path, dest: &Path) -> PathBuf {
    let start = normalize(start);
    let dest = normalize(dest);
    let start: Vec<Component> = start.components().collect();
    let dest: Vec<Component> = dest.components().collect();

    let common = start
        .iter()
        .zip(dest.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..start.len() {
        out.push("..");
    }
    for component in &dest[common..] {
        out.push(component.as_os_str());
    }
    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

/// Resolve `.` and `..` without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().map(|c| c.as_os_str()).collect()
}
