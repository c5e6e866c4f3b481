//! Record lookup by shard path
//!
//! The canonical record for `<dir>/<rest>` is `<dir>/<rest>.mpk`. Some records
//! carry an extra timestamp between name and extension
//! (`<rest>.<timestamp>.mpk`), so when the canonical file is missing any
//! record file in the same directory is accepted.

use crate::error::StoreError;
use crate::tree::shard::shard;
use crate::types::RECORD_EXTENSION;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// How a record file was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateStrategy {
    /// `<shard-path>.mpk` existed.
    Exact,
    /// Picked from the other record files in the shard's parent directory.
    Fallback,
}

/// A located record file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHandle {
    path: PathBuf,
    strategy: LocateStrategy,
}

impl RecordHandle {
    /// Handle for a record file already known to exist (e.g. from a directory scan).
    pub fn at(path: impl Into<PathBuf>) -> Self {
        RecordHandle {
            path: path.into(),
            strategy: LocateStrategy::Exact,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn strategy(&self) -> LocateStrategy {
        self.strategy
    }
}

/// Find the record file for an absolute shard path (`<nodes>/aa/bb/cc/dd/rest`).
///
/// Fallback candidates are sorted by file name. Candidates whose name starts
/// with the expected stem win over unrelated ones; when several remain the
/// first is returned and the ambiguity is logged.
pub fn locate(shard_path: &Path) -> Result<RecordHandle, StoreError> {
    let exact = with_record_extension(shard_path);
    if exact.is_file() {
        return Ok(RecordHandle {
            path: exact,
            strategy: LocateStrategy::Exact,
        });
    }

    let parent = match shard_path.parent() {
        Some(parent) if parent.is_dir() => parent,
        _ => return Err(StoreError::RecordNotFound(shard_path.to_path_buf())),
    };

    let mut candidates: Vec<PathBuf> = std::fs::read_dir(parent)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension() == Some(OsStr::new(RECORD_EXTENSION)) && path.is_file())
        .collect();
    candidates.sort();

    let stem = shard_path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let preferred: Vec<&PathBuf> = candidates
        .iter()
        .filter(|p| {
            !stem.is_empty()
                && p.file_name()
                    .map(|n| n.to_string_lossy().starts_with(stem.as_str()))
                    .unwrap_or(false)
        })
        .collect();
    let pool: Vec<&PathBuf> = if preferred.is_empty() {
        candidates.iter().collect()
    } else {
        preferred
    };

    match pool.first() {
        Some(first) => {
            if pool.len() > 1 {
                tracing::warn!(
                    "{} record candidates for {}, using {}",
                    pool.len(),
                    shard_path.display(),
                    first.display()
                );
            }
            Ok(RecordHandle {
                path: (*first).clone(),
                strategy: LocateStrategy::Fallback,
            })
        }
        None => Err(StoreError::RecordNotFound(shard_path.to_path_buf())),
    }
}

/// Find the record for `id` under a space's `nodes` directory.
pub fn locate_id(nodes_dir: &Path, id: &str) -> Result<RecordHandle, StoreError> {
    locate(&nodes_dir.join(shard(id)?))
}

/// Directory counterpart of a record file: the record path with its extension removed.
pub fn record_dir(record_path: &Path) -> PathBuf {
    match (record_path.parent(), record_path.file_stem()) {
        (Some(parent), Some(stem)) => parent.join(stem),
        _ => record_path.to_path_buf(),
    }
}

fn with_record_extension(shard_path: &Path) -> PathBuf {
    let mut name = shard_path.as_os_str().to_os_string();
    name.push(".");
    name.push(RECORD_EXTENSION);
    PathBuf::from(name)
}
