//! XDG base directories.

use crate::error::ApiError;
use std::path::PathBuf;

/// `$XDG_CONFIG_HOME`, or `$HOME/.config` when unset.
pub fn config_home() -> Result<PathBuf, ApiError> {
    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg_config_home.is_empty() {
            return Ok(PathBuf::from(xdg_config_home));
        }
    }

    let home = std::env::var("HOME").map_err(|_| {
        ApiError::ConfigError(
            "Could not determine XDG config home directory (HOME not set)".to_string(),
        )
    })?;
    Ok(PathBuf::from(home).join(".config"))
}

/// `$XDG_CONFIG_HOME/treemend/config.toml`
pub fn global_config_path() -> Result<PathBuf, ApiError> {
    Ok(config_home()?.join("treemend").join("config.toml"))
}
