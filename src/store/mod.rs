//! Store layout
//!
//! Entry point for reading an on-disk store: validates the root, discovers
//! spaces, and hands out the per-space directories the resolver and symlink
//! auditor work on.

pub mod locator;
pub mod record;
pub mod space;

pub use locator::{locate, locate_id, record_dir, LocateStrategy, RecordHandle};
pub use record::{fields, Record};
pub use space::SpaceInfo;

use crate::error::StoreError;
use crate::tree::shard::shard;
use crate::types::Identifier;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Which half of the store to work on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreArea {
    /// `storage/users/spaces`
    Data,
    /// `storage/metadata/spaces`
    Metadata,
}

impl StoreArea {
    pub fn subdir(&self) -> &'static str {
        match self {
            StoreArea::Data => "storage/users/spaces",
            StoreArea::Metadata => "storage/metadata/spaces",
        }
    }
}

/// A validated store root.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    /// Open a store root. Fails when `<root>/storage` is not a directory.
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        if !root.join("storage").is_dir() {
            return Err(StoreError::InvalidStoreRoot(root.to_path_buf()));
        }
        let root = dunce::canonicalize(root)?;
        Ok(StoreLayout { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn spaces_dir(&self, area: StoreArea) -> PathBuf {
        self.root.join(area.subdir())
    }

    /// Every `<spaces>/*/*/nodes` directory, sorted.
    pub fn discover_spaces(&self, area: StoreArea) -> Result<Vec<SpaceDir>, StoreError> {
        let spaces_dir = self.spaces_dir(area);
        if !spaces_dir.is_dir() {
            return Err(StoreError::InvalidStoreRoot(spaces_dir));
        }

        let mut spaces = Vec::new();
        for entry in WalkDir::new(&spaces_dir)
            .min_depth(3)
            .max_depth(3)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(
                        "Skipping unreadable entry under {}: {}",
                        spaces_dir.display(),
                        e
                    );
                    continue;
                }
            };
            if entry.file_name() != "nodes" || !entry.file_type().is_dir() {
                continue;
            }
            if let Some(space) = SpaceDir::from_nodes_dir(entry.path()) {
                spaces.push(space);
            }
        }
        Ok(spaces)
    }
}

/// One space on disk: `<spaces>/<aa>/<rest>/{nodes,blobs}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceDir {
    pub space_id: Identifier,
    pub space_dir: PathBuf,
    pub nodes_dir: PathBuf,
}

impl SpaceDir {
    /// Build from a `nodes` directory; the space id is the concatenation of the
    /// two directory names above it.
    pub fn from_nodes_dir(nodes_dir: &Path) -> Option<Self> {
        let space_dir = nodes_dir.parent()?;
        let tail = space_dir.file_name()?.to_str()?;
        let head = space_dir.parent()?.file_name()?.to_str()?;
        Some(SpaceDir {
            space_id: Identifier::new(format!("{}{}", head, tail)),
            space_dir: space_dir.to_path_buf(),
            nodes_dir: nodes_dir.to_path_buf(),
        })
    }

    pub fn blobs_dir(&self) -> PathBuf {
        self.space_dir.join("blobs")
    }

    /// Shard path of the space root record (without extension).
    pub fn root_shard_path(&self) -> Result<PathBuf, StoreError> {
        Ok(self.nodes_dir.join(shard(self.space_id.as_str())?))
    }

    /// Location of a blob's content file.
    pub fn blob_path(&self, blob_id: &str) -> Result<PathBuf, StoreError> {
        Ok(self.blobs_dir().join(shard(blob_id)?))
    }

    /// Locate and decode the space root record.
    pub fn root_record(&self) -> Result<Record, StoreError> {
        let handle = locate(&self.root_shard_path()?)?;
        Record::decode(&handle)
    }
}
