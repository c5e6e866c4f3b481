//! Checkpoints
//!
//! Persisted snapshots of expensive scan results so a long run can resume.
//! A checkpoint is addressed by `<prefix><tag><user>` (e.g. `state-node_einstein`)
//! and stored wholesale through a [`CheckpointStore`]. Checkpoints are never
//! invalidated automatically.

pub mod file;
pub mod memory;
pub mod sled_store;

pub use self::file::FileCheckpointStore;
pub use self::memory::MemoryCheckpointStore;
pub use self::sled_store::SledCheckpointStore;

use crate::error::StoreError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which intermediate result a checkpoint holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointTag {
    /// Every record file under a space's `nodes` directory.
    Nodes,
    /// The resolved name → (parent path, blob id) mapping.
    Files,
}

impl CheckpointTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckpointTag::Nodes => "node_",
            CheckpointTag::Files => "files_",
        }
    }
}

/// `(prefix, tag, user)` key of a checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointKey {
    pub prefix: String,
    pub tag: CheckpointTag,
    pub user: String,
}

impl CheckpointKey {
    pub fn new(prefix: impl Into<String>, tag: CheckpointTag, user: impl Into<String>) -> Self {
        CheckpointKey {
            prefix: prefix.into(),
            tag,
            user: user.into(),
        }
    }

    /// Storage name: prefix, tag, and user concatenated.
    pub fn name(&self) -> String {
        format!("{}{}{}", self.prefix, self.tag.as_str(), self.user)
    }
}

impl fmt::Display for CheckpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Raw byte storage for checkpoints.
pub trait CheckpointStore {
    /// Stored bytes, or `None` when nothing was saved under `key`.
    fn load(&self, key: &CheckpointKey) -> Result<Option<Vec<u8>>, StoreError>;
    /// Replace whatever is stored under `key`.
    fn save(&self, key: &CheckpointKey, bytes: &[u8]) -> Result<(), StoreError>;
}

/// Backend selection from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointBackend {
    #[default]
    File,
    Sled,
}

/// Outcome of [`load_or_compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointSource {
    Hit,
    Computed,
}

/// Read a typed checkpoint. Absent, empty, and undecodable payloads are misses;
/// an undecodable payload is logged as corrupt.
pub fn load<T: DeserializeOwned>(
    store: &dyn CheckpointStore,
    key: &CheckpointKey,
) -> Result<Option<T>, StoreError> {
    let bytes = match store.load(key)? {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return Ok(None),
    };
    match bincode::deserialize(&bytes) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            let err = StoreError::CheckpointCorrupt {
                key: key.name(),
                reason: e.to_string(),
            };
            tracing::warn!("{}; recomputing", err);
            Ok(None)
        }
    }
}

/// Write a typed checkpoint.
pub fn save<T: Serialize>(
    store: &dyn CheckpointStore,
    key: &CheckpointKey,
    value: &T,
) -> Result<(), StoreError> {
    let bytes = bincode::serialize(value).map_err(|e| StoreError::Backend(e.to_string()))?;
    store.save(key, &bytes)
}

/// Use the checkpoint under `key` if there is a valid one, otherwise run
/// `compute` and persist its result.
pub fn load_or_compute<T, F>(
    store: &dyn CheckpointStore,
    key: &CheckpointKey,
    compute: F,
) -> Result<(T, CheckpointSource), StoreError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<T, StoreError>,
{
    if let Some(value) = load(store, key)? {
        tracing::debug!("Using checkpoint {}", key);
        return Ok((value, CheckpointSource::Hit));
    }
    let value = compute()?;
    save(store, key, &value)?;
    tracing::debug!("Saved checkpoint {}", key);
    Ok((value, CheckpointSource::Computed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_key_name() {
        let key = CheckpointKey::new("state-", CheckpointTag::Nodes, "einstein");
        assert_eq!(key.name(), "state-node_einstein");
        let key = CheckpointKey::new("/tmp/run1-", CheckpointTag::Files, "marie");
        assert_eq!(key.to_string(), "/tmp/run1-files_marie");
    }

    #[test]
    fn test_load_or_compute_hit_skips_compute() {
        let store = MemoryCheckpointStore::new();
        let key = CheckpointKey::new("t-", CheckpointTag::Files, "u");
        save(&store, &key, &vec!["a".to_string(), "b".to_string()]).unwrap();

        let called = Cell::new(false);
        let (value, source): (Vec<String>, _) = load_or_compute(&store, &key, || {
            called.set(true);
            Ok(Vec::new())
        })
        .unwrap();
        assert_eq!(source, CheckpointSource::Hit);
        assert_eq!(value, vec!["a", "b"]);
        assert!(!called.get());
    }

    #[test]
    fn test_empty_and_corrupt_are_misses() {
        let store = MemoryCheckpointStore::new();
        let key = CheckpointKey::new("t-", CheckpointTag::Nodes, "u");

        store.save(&key, &[]).unwrap();
        let (value, source) = load_or_compute(&store, &key, || Ok(vec![1u32, 2])).unwrap();
        assert_eq!(source, CheckpointSource::Computed);
        assert_eq!(value, vec![1, 2]);

        store.save(&key, &[0xff]).unwrap();
        let (value, source) = load_or_compute(&store, &key, || Ok(vec![3u32])).unwrap();
        assert_eq!(source, CheckpointSource::Computed);
        assert_eq!(value, vec![3]);

        let reloaded: Option<Vec<u32>> = load(&store, &key).unwrap();
        assert_eq!(reloaded, Some(vec![3]));
    }

    #[test]
    fn test_compute_error_is_not_persisted() {
        let store = MemoryCheckpointStore::new();
        let key = CheckpointKey::new("t-", CheckpointTag::Nodes, "u");
        let result: Result<(Vec<u32>, _), _> =
            load_or_compute(&store, &key, || Err(StoreError::Backend("boom".into())));
        assert!(result.is_err());
        assert!(store.load(&key).unwrap().is_none());
    }
}
