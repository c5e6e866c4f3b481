//! Identifier → shard path mapping

use crate::error::StoreError;
use std::path::PathBuf;

/// Number of leading characters split into two-character directory segments.
pub const SHARD_PREFIX_LEN: usize = 8;

/// Map an identifier to its relative shard path.
///
/// The first eight characters become four two-character segments and the
/// remainder, however short, becomes the final segment:
/// `1234567890abcdef...` → `12/34/56/78/90abcdef...`.
pub fn shard(id: &str) -> Result<PathBuf, StoreError> {
    Ok(PathBuf::from(shard_string(id)?))
}

/// Same as [`shard`], returned as a `/`-joined string.
pub fn shard_string(id: &str) -> Result<String, StoreError> {
    if id.len() < SHARD_PREFIX_LEN || !id.is_ascii() {
        return Err(StoreError::MalformedIdentifier(id.to_string()));
    }
    let mut segments: Vec<&str> = (0..SHARD_PREFIX_LEN)
        .step_by(2)
        .map(|i| &id[i..i + 2])
        .collect();
    segments.push(&id[SHARD_PREFIX_LEN..]);
    Ok(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_shard_known_identifier() {
        let path = shard_string("1234567890abcdef1234567890abcdef").unwrap();
        assert_eq!(path, "12/34/56/78/90abcdef1234567890abcdef");
    }

    #[test]
    fn test_shard_short_remainder() {
        assert_eq!(shard_string("12345678").unwrap(), "12/34/56/78/");
        assert_eq!(shard_string("123456789").unwrap(), "12/34/56/78/9");
    }

    #[test]
    fn test_shard_rejects_short_or_empty() {
        assert!(matches!(shard(""), Err(StoreError::MalformedIdentifier(_))));
        assert!(matches!(shard("1234567"), Err(StoreError::MalformedIdentifier(_))));
    }

    #[test]
    fn test_shard_rejects_non_ascii() {
        assert!(shard("ü234567890abcdef").is_err());
    }

    proptest! {
        #[test]
        fn prop_shard_has_five_segments(id in "[0-9a-f]{32}") {
            let path = shard_string(&id).unwrap();
            let segments: Vec<&str> = path.split('/').collect();
            prop_assert_eq!(segments.len(), 5);
            for segment in &segments[..4] {
                prop_assert_eq!(segment.len(), 2);
            }
            prop_assert_eq!(segments.concat(), id);
        }
    }
}
