//! Error types
//!
//! `StoreError` covers everything that can go wrong while reading the store,
//! resolving the tree, or repairing symlinks. `ApiError` is what command-level
//! code (config, logging, CLI) returns.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the store, resolver, checkpoint, and symlink layers.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Malformed identifier: {0:?}")]
    MalformedIdentifier(String),

    #[error("No record for {0}")]
    RecordNotFound(PathBuf),

    #[error("Unpack failed for file {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("No record for {parent_id} (parent of {record})")]
    DanglingParent { record: PathBuf, parent_id: String },

    #[error("Parent chain of {record} does not reach space {space_id} (stopped at {last_id})")]
    CyclicParent {
        record: PathBuf,
        space_id: String,
        last_id: String,
    },

    #[error("Symlink conflict at {path}: {reason}")]
    SymlinkConflict { path: PathBuf, reason: String },

    #[error("Checkpoint {key} is corrupt: {reason}")]
    CheckpointCorrupt { key: String, reason: String },

    #[error("'storage' folder not found in {0}")]
    InvalidStoreRoot(PathBuf),

    #[error("Checkpoint backend error: {0}")]
    Backend(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        StoreError::DecodeError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn conflict(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        StoreError::SymlinkConflict {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Command-level errors.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
