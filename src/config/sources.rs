//! Config sources: global file and `TREEMEND__*` environment.

use crate::config::xdg;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File};
use std::path::Path;

pub const ENV_PREFIX: &str = "TREEMEND";

/// Add the global config file if one exists.
pub fn add_global_file(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match xdg::global_config_path() {
        Ok(path) => Ok(builder.add_source(File::from(path).required(false))),
        Err(e) => {
            tracing::debug!("No global config: {}", e);
            Ok(builder)
        }
    }
}

/// Add an explicitly named config file; it must exist.
pub fn add_file(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }
    Ok(builder.add_source(File::from(path.to_path_buf()).required(true)))
}

/// Environment overlay: `TREEMEND__CHECKPOINT__PREFIX=run1-` sets `checkpoint.prefix`.
pub fn add_environment(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    ))
}
