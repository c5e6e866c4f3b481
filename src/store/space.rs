//! Space root summary (name, type, owner, size).

use crate::error::StoreError;
use crate::store::record::{fields, Record};
use crate::types::NOT_AVAILABLE;
use serde::Serialize;

/// Summary of a space root record.
#[derive(Debug, Clone, Serialize)]
pub struct SpaceInfo {
    pub name: String,
    pub alias: String,
    pub space_type: String,
    pub tree_size: Option<u64>,
    /// Second `/`-separated segment of the alias (`personal/einstein` → `einstein`).
    pub user: String,
}

impl SpaceInfo {
    pub fn from_record(record: &Record) -> Result<Self, StoreError> {
        let alias = record.text(fields::SPACE_ALIAS)?;
        let user = if alias == NOT_AVAILABLE {
            alias.clone()
        } else {
            alias
                .split('/')
                .nth(1)
                .map(str::to_string)
                .unwrap_or_else(|| alias.clone())
        };
        Ok(SpaceInfo {
            name: record.text(fields::SPACE_NAME)?,
            alias,
            space_type: record.text(fields::SPACE_TYPE)?,
            tree_size: record.tree_size(),
            user,
        })
    }

    /// Name used for output directories; personal spaces drop the `<prefix>_`.
    pub fn display_name(&self) -> &str {
        if self.space_type == "personal" {
            if let Some((_, rest)) = self.name.split_once('_') {
                return rest;
            }
        }
        &self.name
    }

    pub fn human_size(&self) -> String {
        match self.tree_size {
            Some(bytes) => human_size(bytes),
            None => NOT_AVAILABLE.to_string(),
        }
    }

    /// Case-insensitive substring filters on space name and owning user.
    pub fn matches(&self, name_filter: Option<&str>, user_filter: Option<&str>) -> bool {
        let contains = |haystack: &str, needle: &str| {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        };
        name_filter.map_or(true, |f| contains(&self.name, f))
            && user_filter.map_or(true, |f| contains(&self.user, f))
    }
}

/// Render a byte count as bytes, KiB, MiB, or GiB with two decimals.
pub fn human_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    const GIB: u64 = MIB * 1024;
    match bytes {
        b if b >= GIB => format!("{:.2} GiB", b as f64 / GIB as f64),
        b if b >= MIB => format!("{:.2} MiB", b as f64 / MIB as f64),
        b if b >= KIB => format!("{:.2} KiB", b as f64 / KIB as f64),
        b => format!("{} bytes", b),
    }
}
