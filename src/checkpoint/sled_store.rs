//! Sled-backed checkpoint store.

use crate::checkpoint::{CheckpointKey, CheckpointStore};
use crate::error::StoreError;
use std::path::Path;

const CHECKPOINT_TREE: &str = "checkpoints";

/// Keeps every checkpoint in one sled tree keyed by checkpoint name.
pub struct SledCheckpointStore {
    tree: sled::Tree,
}

impl SledCheckpointStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|e| {
            StoreError::Backend(format!("Failed to open sled database {}: {}", path.display(), e))
        })?;
        Self::from_db(&db)
    }

    pub fn from_db(db: &sled::Db) -> Result<Self, StoreError> {
        let tree = db
            .open_tree(CHECKPOINT_TREE)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(SledCheckpointStore { tree })
    }
}

impl CheckpointStore for SledCheckpointStore {
    fn load(&self, key: &CheckpointKey) -> Result<Option<Vec<u8>>, StoreError> {
        self.tree
            .get(key.name().as_bytes())
            .map(|value| value.map(|v| v.to_vec()))
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn save(&self, key: &CheckpointKey, bytes: &[u8]) -> Result<(), StoreError> {
        self.tree
            .insert(key.name().as_bytes(), bytes)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        self.tree
            .flush()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }
}
