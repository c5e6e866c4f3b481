//! CLI Tooling
//!
//! Command-line interface: `dump`, `verify`, and `view`.

use crate::config::{ConfigLoader, TreemendConfig};
use crate::error::ApiError;
use crate::store::{StoreArea, StoreLayout};
use crate::symlink::{AuditMode, SymlinkAuditor};
use crate::tooling::dump::{default_output_dir, dump_store, DumpOptions};
use crate::tooling::format::{format_audit_summary, format_dump_report};
use crate::tooling::view::{search_records, view_record};
use clap::{ArgGroup, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

/// Treemend - inspect and repair a sharded metadata store
#[derive(Parser, Debug)]
#[command(name = "treemend")]
#[command(about = "Inspect, dump, and repair the symlink tree of a sharded metadata store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (merged over the global config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the files of each data space and copy their blobs out
    Dump {
        /// Store root (the directory containing `storage`)
        root: Option<PathBuf>,
        /// Only spaces whose name contains this text
        #[arg(long)]
        user: Option<String>,
        /// Only spaces whose owning user contains this text
        #[arg(long)]
        username: Option<String>,
        /// Print entries without copying blobs
        #[arg(long)]
        list: bool,
        /// Print space headers only
        #[arg(long)]
        info: bool,
        /// Resolve full parent paths instead of the immediate parent
        #[arg(long)]
        deep: bool,
        /// Copy destination (default: /tmp/ocis-dump-<timestamp>)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Checkpoint name prefix
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Check that every node has the symlink its parent chain implies
    #[command(group(ArgGroup::new("area").required(true).args(["data", "metadata"])))]
    Verify {
        /// Store root (the directory containing `storage`)
        root: Option<PathBuf>,
        /// Check storage/users/spaces
        #[arg(long)]
        data: bool,
        /// Check storage/metadata/spaces
        #[arg(long)]
        metadata: bool,
        /// Repair missing or wrong symlinks
        #[arg(long)]
        fix: bool,
    },
    /// Print decoded records as JSON
    View {
        /// Record file, or directory with --search
        path: PathBuf,
        /// Decode every record below the directory
        #[arg(long)]
        search: bool,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Dump { .. } => "dump",
        Commands::Verify { .. } => "verify",
        Commands::View { .. } => "view",
    }
}

/// CLI context: merged configuration plus command dispatch.
pub struct CliContext {
    config: TreemendConfig,
}

impl CliContext {
    /// Load configuration and apply the global CLI overrides.
    pub fn new(cli: &Cli) -> Result<Self, ApiError> {
        let mut config = ConfigLoader::load(cli.config.as_deref())?;
        apply_overrides(&mut config, cli);
        Ok(Self { config })
    }

    pub fn with_config(config: TreemendConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TreemendConfig {
        &self.config
    }

    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        info!(command = command_name(command), "Running command");
        match command {
            Commands::Dump {
                root,
                user,
                username,
                list,
                info,
                deep,
                output,
                prefix,
            } => {
                let layout = self.open_store(root.as_deref())?;
                let mut options =
                    DumpOptions::new(output.clone().unwrap_or_else(default_output_dir));
                options.space_filter = user.clone();
                options.user_filter = username.clone();
                options.list_only = *list;
                options.info_only = *info;
                options.deep = *deep;
                options.checkpoint_prefix = prefix
                    .clone()
                    .unwrap_or_else(|| self.config.checkpoint.prefix.clone());

                let checkpoints = self.config.checkpoint.open_store()?;
                let report = dump_store(&layout, checkpoints.as_ref(), &options)?;
                Ok(format_dump_report(
                    &report,
                    user.as_deref(),
                    username.as_deref(),
                    *info,
                ))
            }
            Commands::Verify {
                root,
                data: _,
                metadata,
                fix,
            } => {
                let layout = self.open_store(root.as_deref())?;
                let area = if *metadata {
                    StoreArea::Metadata
                } else {
                    StoreArea::Data
                };
                let mode = if *fix {
                    AuditMode::Repair
                } else {
                    AuditMode::Audit
                };
                let summary = SymlinkAuditor::new(mode).run(&layout, area)?;
                Ok(format_audit_summary(&summary))
            }
            Commands::View {
                path,
                search,
                output,
            } => {
                let value = if *search {
                    search_records(path)?
                } else {
                    view_record(path)?
                };
                let rendered = serde_json::to_string_pretty(&value)?;
                match output {
                    Some(file) => {
                        std::fs::write(file, rendered.as_bytes())?;
                        Ok(format!("Wrote {}", file.display()))
                    }
                    None => Ok(rendered),
                }
            }
        }
    }

    fn open_store(&self, root: Option<&Path>) -> Result<StoreLayout, ApiError> {
        let root = root
            .map(Path::to_path_buf)
            .or_else(|| self.config.store_root.clone())
            .ok_or_else(|| {
                ApiError::Usage("no store root given and none configured (store_root)".into())
            })?;
        Ok(StoreLayout::open(&root)?)
    }
}

/// CLI flags win over every config source.
pub fn apply_overrides(config: &mut TreemendConfig, cli: &Cli) {
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }
    if let Some(output) = &cli.log_output {
        config.logging.output = output.clone();
    }
    if let Some(file) = &cli.log_file {
        config.logging.file = Some(file.clone());
    }
}
