//! In-memory checkpoint store.

use crate::checkpoint::{CheckpointKey, CheckpointStore};
use crate::error::StoreError;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Keeps checkpoints in a map; used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn contains(&self, key: &CheckpointKey) -> bool {
        self.entries.lock().contains_key(&key.name())
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn load(&self, key: &CheckpointKey) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.lock().get(&key.name()).cloned())
    }

    fn save(&self, key: &CheckpointKey, bytes: &[u8]) -> Result<(), StoreError> {
        self.entries.lock().insert(key.name(), bytes.to_vec());
        Ok(())
    }
}
