//! Decoded record dumps as JSON.

use crate::error::{ApiError, StoreError};
use crate::store::Record;
use crate::tree::find_all_records;
use serde_json::{Map, Value};
use std::path::Path;

/// Fields of one record as a JSON object; binary values are rendered lossily.
pub fn record_json(record: &Record) -> Value {
    let fields: Map<String, Value> = record
        .iter()
        .map(|(key, value)| {
            (
                key.to_string(),
                Value::String(String::from_utf8_lossy(value).into_owned()),
            )
        })
        .collect();
    Value::Object(fields)
}

/// Decode a single record file.
pub fn view_record(path: &Path) -> Result<Value, StoreError> {
    Ok(record_json(&Record::decode_file(path)?))
}

/// Decode every record below `dir`, keyed by path. Undecodable records are
/// reported under an `error` key instead of aborting.
pub fn search_records(dir: &Path) -> Result<Value, ApiError> {
    if !dir.is_dir() {
        return Err(ApiError::Usage(format!(
            "--search expects a directory, got {}",
            dir.display()
        )));
    }
    let mut out = Map::new();
    for path in find_all_records(dir)? {
        let value = match view_record(&path) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("{}", e);
                serde_json::json!({ "error": e.to_string() })
            }
        };
        out.insert(path.display().to_string(), value);
    }
    Ok(Value::Object(out))
}
