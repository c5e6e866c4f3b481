//! Space tree resolution
//!
//! Builds the name → (logical parent path, blob id) mapping for every file in
//! a space. The shallow mapping looks up only the immediate parent's name, so
//! a file three levels deep is reported as `./<parent>/<name>`; the deep
//! mapping walks the whole ancestor chain instead. Both scans reuse the
//! record listing checkpoint; only the shallow mapping is checkpointed itself.

use crate::checkpoint::{self, CheckpointKey, CheckpointSource, CheckpointStore, CheckpointTag};
use crate::error::StoreError;
use crate::store::{locate_id, Record, SpaceDir};
use crate::tree::ancestry::resolve_ancestry;
use crate::types::RECORD_EXTENSION;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Where a file sits in the logical tree and which blob holds its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedFile {
    pub parent_path: String,
    pub blob_id: String,
}

/// File name → location. Later records with the same name replace earlier ones.
pub type SpaceMapping = BTreeMap<String, ResolvedFile>;

/// A record that could not be placed in the mapping.
#[derive(Debug)]
pub struct ResolveIssue {
    pub record: PathBuf,
    pub error: StoreError,
}

/// Result of resolving one space.
#[derive(Debug)]
pub struct SpaceResolution {
    pub mapping: SpaceMapping,
    pub issues: Vec<ResolveIssue>,
    pub records_source: CheckpointSource,
    pub mapping_source: CheckpointSource,
}

/// All record files below `nodes_dir`, sorted. Unreadable subdirectories are
/// skipped with a warning; only an unreadable `nodes_dir` itself is an error.
pub fn find_all_records(nodes_dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let mut records = Vec::new();
    for entry in WalkDir::new(nodes_dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(StoreError::Io(e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::other(format!("cannot walk {}", nodes_dir.display()))
                })));
            }
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {}: {}", nodes_dir.display(), e);
                continue;
            }
        };
        if entry.file_type().is_file()
            && entry.path().extension() == Some(OsStr::new(RECORD_EXTENSION))
        {
            records.push(entry.into_path());
        }
    }
    tracing::debug!("Found {} records under {}", records.len(), nodes_dir.display());
    Ok(records)
}

/// One-hop mapping over `records`. Per-record failures are collected, never fatal.
pub fn resolve_records(space: &SpaceDir, records: &[PathBuf]) -> (SpaceMapping, Vec<ResolveIssue>) {
    collect(records, |path| resolve_shallow(space, path))
}

/// Full-chain mapping over `records`.
pub fn resolve_records_deep(
    space: &SpaceDir,
    records: &[PathBuf],
) -> (SpaceMapping, Vec<ResolveIssue>) {
    collect(records, |path| resolve_deep(space, path))
}

fn collect<F>(records: &[PathBuf], mut resolve: F) -> (SpaceMapping, Vec<ResolveIssue>)
where
    F: FnMut(&Path) -> Result<Option<(String, ResolvedFile)>, StoreError>,
{
    let mut mapping = SpaceMapping::new();
    let mut issues = Vec::new();
    for path in records {
        match resolve(path) {
            Ok(Some((name, file))) => {
                mapping.insert(name, file);
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!("{}", error);
                issues.push(ResolveIssue {
                    record: path.clone(),
                    error,
                });
            }
        }
    }
    (mapping, issues)
}

fn resolve_shallow(
    space: &SpaceDir,
    path: &Path,
) -> Result<Option<(String, ResolvedFile)>, StoreError> {
    let record = Record::decode_file(path)?;
    let blob_id = record.blob_id()?;
    if blob_id.is_sentinel() {
        return Ok(None);
    }
    let name = record.name()?;
    let parent_id = record.parent_id()?;

    let parent_path = if parent_id == space.space_id {
        ".".to_string()
    } else if parent_id.is_sentinel() {
        tracing::debug!("{} has no parent id", path.display());
        return Ok(None);
    } else {
        let handle = locate_id(&space.nodes_dir, parent_id.as_str()).map_err(|e| match e {
            StoreError::RecordNotFound(_) => StoreError::DanglingParent {
                record: path.to_path_buf(),
                parent_id: parent_id.to_string(),
            },
            other => other,
        })?;
        let parent_name = Record::decode(&handle)?.name()?;
        format!("./{}", parent_name)
    };

    Ok(Some((
        name,
        ResolvedFile {
            parent_path,
            blob_id: blob_id.to_string(),
        },
    )))
}

fn resolve_deep(
    space: &SpaceDir,
    path: &Path,
) -> Result<Option<(String, ResolvedFile)>, StoreError> {
    let record = Record::decode_file(path)?;
    let blob_id = record.blob_id()?;
    if blob_id.is_sentinel() {
        return Ok(None);
    }
    let ancestry = resolve_ancestry(space, &record)?;
    Ok(Some((
        record.name()?,
        ResolvedFile {
            parent_path: ancestry.logical_parent_path(),
            blob_id: blob_id.to_string(),
        },
    )))
}

/// Resolves a space with checkpoint reuse.
pub struct TreeResolver<'a> {
    space: &'a SpaceDir,
    checkpoints: &'a dyn CheckpointStore,
    prefix: &'a str,
    user: &'a str,
}

impl<'a> TreeResolver<'a> {
    /// `prefix` and `user` form the checkpoint keys (`<prefix>node_<user>`,
    /// `<prefix>files_<user>`).
    pub fn new(
        space: &'a SpaceDir,
        checkpoints: &'a dyn CheckpointStore,
        prefix: &'a str,
        user: &'a str,
    ) -> Self {
        TreeResolver {
            space,
            checkpoints,
            prefix,
            user,
        }
    }

    fn key(&self, tag: CheckpointTag) -> CheckpointKey {
        CheckpointKey::new(self.prefix, tag, self.user)
    }

    /// Record listing for the space, from checkpoint or a full scan.
    pub fn records(&self) -> Result<(Vec<PathBuf>, CheckpointSource), StoreError> {
        checkpoint::load_or_compute(self.checkpoints, &self.key(CheckpointTag::Nodes), || {
            tracing::info!("Scanning {}", self.space.nodes_dir.display());
            find_all_records(&self.space.nodes_dir)
        })
    }

    /// Shallow (one-hop) mapping of the space.
    pub fn resolve_space(&self) -> Result<SpaceResolution, StoreError> {
        let files_key = self.key(CheckpointTag::Files);
        if let Some(mapping) = checkpoint::load::<SpaceMapping>(self.checkpoints, &files_key)? {
            tracing::debug!("Using checkpoint {}", files_key);
            return Ok(SpaceResolution {
                mapping,
                issues: Vec::new(),
                records_source: CheckpointSource::Hit,
                mapping_source: CheckpointSource::Hit,
            });
        }

        let (records, records_source) = self.records()?;
        let (mapping, issues) = resolve_records(self.space, &records);
        checkpoint::save(self.checkpoints, &files_key, &mapping)?;
        Ok(SpaceResolution {
            mapping,
            issues,
            records_source,
            mapping_source: CheckpointSource::Computed,
        })
    }

    /// Mapping with full multi-level parent paths. Never checkpointed.
    pub fn resolve_space_deep(&self) -> Result<SpaceResolution, StoreError> {
        let (records, records_source) = self.records()?;
        let (mapping, issues) = resolve_records_deep(self.space, &records);
        Ok(SpaceResolution {
            mapping,
            issues,
            records_source,
            mapping_source: CheckpointSource::Computed,
        })
    }
}
