//! One checkpoint per file, named after the checkpoint key.

use crate::checkpoint::{CheckpointKey, CheckpointStore};
use crate::error::StoreError;
use std::path::{Path, PathBuf};

/// Stores each checkpoint as `<dir>/<prefix><tag><user>`.
///
/// The prefix may itself contain path separators; missing parent directories
/// are created on save.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    dir: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileCheckpointStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &CheckpointKey) -> PathBuf {
        self.dir.join(key.name())
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn load(&self, key: &CheckpointKey) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(std::fs::read(&path)?))
    }

    fn save(&self, key: &CheckpointKey, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::CheckpointTag;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip_and_naming() {
        let temp = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(temp.path());
        let key = CheckpointKey::new("state-", CheckpointTag::Files, "einstein");

        assert!(store.load(&key).unwrap().is_none());
        store.save(&key, b"payload").unwrap();
        assert!(temp.path().join("state-files_einstein").is_file());
        assert_eq!(store.load(&key).unwrap(), Some(b"payload".to_vec()));
    }

    #[test]
    fn test_file_store_prefix_with_directory() {
        let temp = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(temp.path());
        let key = CheckpointKey::new("runs/one-", CheckpointTag::Nodes, "u");
        store.save(&key, b"x").unwrap();
        assert!(temp.path().join("runs/one-node_u").is_file());
    }
}
