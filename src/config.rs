//! Configuration
//!
//! Settings are merged from defaults, the global config file
//! (`$XDG_CONFIG_HOME/treemend/config.toml`), an explicit `--config` file, and
//! `TREEMEND__*` environment variables, in that order. Command-line flags are
//! applied on top by the CLI.

mod facade;
mod merge;
mod sources;
pub mod xdg;

pub use facade::ConfigLoader;

use crate::checkpoint::{
    CheckpointBackend, CheckpointStore, FileCheckpointStore, SledCheckpointStore,
};
use crate::error::StoreError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreemendConfig {
    /// Store root used when a command is given none.
    pub store_root: Option<PathBuf>,
    pub checkpoint: CheckpointConfig,
    pub logging: LoggingConfig,
}

fn default_prefix() -> String {
    "state-".to_string()
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Where checkpoints live and how they are named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointConfig {
    /// Prepended to every checkpoint name; may itself contain a path.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
    #[serde(default)]
    pub backend: CheckpointBackend,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        CheckpointConfig {
            prefix: default_prefix(),
            dir: default_dir(),
            backend: CheckpointBackend::default(),
        }
    }
}

impl CheckpointConfig {
    /// Open the configured backend.
    pub fn open_store(&self) -> Result<Box<dyn CheckpointStore>, StoreError> {
        match self.backend {
            CheckpointBackend::File => Ok(Box::new(FileCheckpointStore::new(&self.dir))),
            CheckpointBackend::Sled => {
                let path = self.dir.join("treemend-checkpoints");
                Ok(Box::new(SledCheckpointStore::open(&path)?))
            }
        }
    }
}
