//! Metadata record decoding
//!
//! A record is a single MessagePack map whose keys and values are byte strings.
//! Values stay raw until a caller asks for them as text; a missing key reads as
//! [`NOT_AVAILABLE`].

use crate::error::StoreError;
use crate::store::locator::RecordHandle;
use crate::types::{Identifier, NodeKind, NOT_AVAILABLE};
use rmpv::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Attribute keys read by the tool.
pub mod fields {
    pub const NAME: &str = "user.ocis.name";
    pub const PARENT_ID: &str = "user.ocis.parentid";
    pub const TYPE: &str = "user.ocis.type";
    pub const BLOB_ID: &str = "user.ocis.blobid";
    pub const SPACE_NAME: &str = "user.ocis.space.name";
    pub const SPACE_ALIAS: &str = "user.ocis.space.alias";
    pub const SPACE_TYPE: &str = "user.ocis.space.type";
    pub const TREE_SIZE: &str = "user.ocis.treesize";
}

/// A decoded metadata record.
#[derive(Debug, Clone)]
pub struct Record {
    path: PathBuf,
    entries: BTreeMap<String, Vec<u8>>,
}

impl Record {
    /// Read and decode the record behind `handle`.
    pub fn decode(handle: &RecordHandle) -> Result<Self, StoreError> {
        Self::decode_file(handle.path())
    }

    /// Read and decode a record file found by a directory scan.
    pub fn decode_file(path: &Path) -> Result<Self, StoreError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(path, &bytes)
    }

    /// Decode a record from its raw bytes. `path` is only used for diagnostics.
    pub fn from_bytes(path: &Path, bytes: &[u8]) -> Result<Self, StoreError> {
        let mut cursor = bytes;
        let value = rmpv::decode::read_value(&mut cursor)
            .map_err(|e| StoreError::decode(path, e))?;
        if !cursor.is_empty() {
            return Err(StoreError::decode(
                path,
                format!("{} trailing bytes after document", cursor.len()),
            ));
        }

        let pairs = match value {
            Value::Map(pairs) => pairs,
            other => {
                return Err(StoreError::decode(
                    path,
                    format!("expected a map, found {}", value_kind(&other)),
                ))
            }
        };

        let mut entries = BTreeMap::new();
        for (key, value) in pairs {
            let key = String::from_utf8(scalar_bytes(path, key)?)
                .map_err(|e| StoreError::decode(path, format!("non UTF-8 key: {}", e)))?;
            let value = scalar_bytes(path, value)?;
            entries.insert(key, value);
        }

        Ok(Record {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn raw(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Field as text, `N/A` when absent.
    pub fn text(&self, key: &str) -> Result<String, StoreError> {
        match self.raw(key) {
            None => Ok(NOT_AVAILABLE.to_string()),
            Some(bytes) => String::from_utf8(bytes.to_vec()).map_err(|_| {
                StoreError::decode(&self.path, format!("field {} is not UTF-8", key))
            }),
        }
    }

    pub fn name(&self) -> Result<String, StoreError> {
        self.text(fields::NAME)
    }

    pub fn parent_id(&self) -> Result<Identifier, StoreError> {
        self.text(fields::PARENT_ID).map(Identifier::from)
    }

    pub fn blob_id(&self) -> Result<Identifier, StoreError> {
        self.text(fields::BLOB_ID).map(Identifier::from)
    }

    pub fn kind(&self) -> Result<NodeKind, StoreError> {
        self.text(fields::TYPE).map(|t| NodeKind::from_field(&t))
    }

    /// `treesize` in bytes; `None` when absent or not a number.
    pub fn tree_size(&self) -> Option<u64> {
        self.text(fields::TREE_SIZE).ok()?.trim().parse().ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn scalar_bytes(path: &Path, value: Value) -> Result<Vec<u8>, StoreError> {
    match value {
        Value::Binary(bytes) => Ok(bytes),
        Value::String(s) => Ok(s.into_bytes()),
        Value::Integer(i) => Ok(i.to_string().into_bytes()),
        Value::Boolean(b) => Ok(b.to_string().into_bytes()),
        Value::Nil => Ok(Vec::new()),
        other => Err(StoreError::decode(
            path,
            format!("unsupported value of kind {}", value_kind(&other)),
        )),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Nil => "nil",
        Value::Boolean(_) => "bool",
        Value::Integer(_) => "integer",
        Value::F32(_) | Value::F64(_) => "float",
        Value::String(_) => "string",
        Value::Binary(_) => "binary",
        Value::Array(_) => "array",
        Value::Map(_) => "map",
        Value::Ext(_, _) => "ext",
    }
}
