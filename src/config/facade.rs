//! ConfigLoader facade delegating to the merge service.

use super::merge::MergeService;
use super::TreemendConfig;
use crate::error::ApiError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from the standard sources plus an optional explicit file.
    pub fn load(explicit: Option<&Path>) -> Result<TreemendConfig, ApiError> {
        Ok(MergeService::load(explicit)?)
    }

    /// Load a single file over the defaults, ignoring global file and environment.
    pub fn load_from_file(path: &Path) -> Result<TreemendConfig, ApiError> {
        Ok(MergeService::load_file_only(path)?)
    }

    pub fn default() -> TreemendConfig {
        TreemendConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::CheckpointBackend;
    use std::path::PathBuf;

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
store_root = "/srv/ocis"

[checkpoint]
prefix = "run1-"
backend = "sled"

[logging]
level = "debug"
"#,
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.store_root, Some(PathBuf::from("/srv/ocis")));
        assert_eq!(config.checkpoint.prefix, "run1-");
        assert_eq!(config.checkpoint.dir, PathBuf::from("."));
        assert_eq!(config.checkpoint.backend, CheckpointBackend::Sled);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.output, "stderr");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(ConfigLoader::load_from_file(&temp.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_invalid_backend_is_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[checkpoint]\nbackend = \"redis\"\n").unwrap();
        assert!(matches!(
            ConfigLoader::load_from_file(&path),
            Err(ApiError::ConfigError(_))
        ));
    }
}
