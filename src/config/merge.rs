//! Merge order and deserialization into [`TreemendConfig`].

use crate::config::sources;
use crate::config::TreemendConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};
use std::path::Path;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: defaults (lowest) → global file → `explicit` file → environment (highest).
    pub fn load(explicit: Option<&Path>) -> Result<TreemendConfig, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = sources::add_global_file(builder)?;
        let builder = match explicit {
            Some(path) => sources::add_file(builder, path)?,
            None => builder,
        };
        let builder = sources::add_environment(builder)?;
        builder.build()?.try_deserialize()
    }

    /// Only `path` over defaults; used by tests and `--config` without global lookup.
    pub fn load_file_only(path: &Path) -> Result<TreemendConfig, ConfigError> {
        let builder = sources::add_file(builder_with_defaults()?, path)?;
        builder.build()?.try_deserialize()
    }
}

fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("checkpoint.prefix", "state-")?
        .set_default("checkpoint.dir", ".")?
        .set_default("checkpoint.backend", "file")
}
