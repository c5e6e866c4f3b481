//! Core types shared across the store, resolver, and symlink layers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Text returned for any record field that is not present.
pub const NOT_AVAILABLE: &str = "N/A";

/// Extension carried by metadata record files.
pub const RECORD_EXTENSION: &str = "mpk";

/// Identifier of a space root, node, or blob.
///
/// Identifiers are read verbatim from records and directory names, so no
/// validation happens on construction. Sharding rejects ids that are too short.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(id: impl Into<String>) -> Self {
        Identifier(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when this is the `N/A` sentinel.
    pub fn is_sentinel(&self) -> bool {
        self.0 == NOT_AVAILABLE
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Identifier(s.to_string())
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Identifier(s)
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Node kind as stored in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    File,
    Directory,
    Unknown,
}

impl NodeKind {
    pub fn from_field(value: &str) -> Self {
        match value {
            "1" => NodeKind::File,
            "2" => NodeKind::Directory,
            _ => NodeKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Directory => "dir",
            NodeKind::Unknown => NOT_AVAILABLE,
        }
    }
}
