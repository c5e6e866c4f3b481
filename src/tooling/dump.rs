//! Store dump
//!
//! Lists the resolved files of every data space and copies their blobs into a
//! browsable tree: `<output>/<space type>/<space name>/<parent path>/<name>`.

use crate::checkpoint::CheckpointStore;
use crate::error::StoreError;
use crate::store::{SpaceDir, SpaceInfo, StoreArea, StoreLayout};
use crate::tree::{ResolvedFile, SpaceResolution, TreeResolver};
use std::path::{Component, Path, PathBuf};

/// Default output directory: `/tmp/ocis-dump-<YYYYmmddHHMMSS>`.
pub fn default_output_dir() -> PathBuf {
    PathBuf::from(format!(
        "/tmp/ocis-dump-{}",
        chrono::Local::now().format("%Y%m%d%H%M%S")
    ))
}

/// What to dump and how.
#[derive(Debug, Clone)]
pub struct DumpOptions {
    /// Substring of the space name.
    pub space_filter: Option<String>,
    /// Substring of the owning user.
    pub user_filter: Option<String>,
    /// Stop after each space header.
    pub info_only: bool,
    /// List entries without copying blobs.
    pub list_only: bool,
    /// Full ancestor paths instead of the immediate parent.
    pub deep: bool,
    pub output: PathBuf,
    /// Checkpoint name prefix.
    pub checkpoint_prefix: String,
}

impl DumpOptions {
    pub fn new(output: PathBuf) -> Self {
        DumpOptions {
            space_filter: None,
            user_filter: None,
            info_only: false,
            list_only: false,
            deep: false,
            output,
            checkpoint_prefix: "state-".to_string(),
        }
    }
}

/// One mapped file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpEntry {
    pub name: String,
    pub parent_path: String,
    pub blob_id: String,
    pub blob_exists: bool,
    /// Where the blob was copied, if it was.
    pub copied_to: Option<PathBuf>,
    /// Why the copy failed, if it did.
    pub copy_error: Option<String>,
}

impl DumpEntry {
    /// `<parent path>/<name>`
    pub fn logical_path(&self) -> String {
        format!("{}/{}", self.parent_path, self.name)
    }
}

/// Everything dumped for one space.
#[derive(Debug)]
pub struct SpaceDump {
    pub space: SpaceDir,
    pub info: SpaceInfo,
    pub entries: Vec<DumpEntry>,
    pub resolve_issues: usize,
    pub from_checkpoint: bool,
}

impl SpaceDump {
    pub fn existing(&self) -> usize {
        self.entries.iter().filter(|e| e.blob_exists).count()
    }

    pub fn missing(&self) -> usize {
        self.entries.len() - self.existing()
    }

    pub fn copy_failures(&self) -> usize {
        self.entries.iter().filter(|e| e.copy_error.is_some()).count()
    }
}

/// Result of a dump run.
#[derive(Debug, Default)]
pub struct DumpReport {
    pub spaces: Vec<SpaceDump>,
    /// Spaces whose root record could not be read or whose tree could not be resolved.
    pub unreadable: Vec<(PathBuf, StoreError)>,
    pub output: Option<PathBuf>,
}

/// Dump every data space matching `options`.
pub fn dump_store(
    layout: &StoreLayout,
    checkpoints: &dyn CheckpointStore,
    options: &DumpOptions,
) -> Result<DumpReport, StoreError> {
    let mut report = DumpReport {
        output: (!options.info_only && !options.list_only).then(|| options.output.clone()),
        ..DumpReport::default()
    };

    for space in layout.discover_spaces(StoreArea::Data)? {
        let info = match space.root_record().and_then(|r| SpaceInfo::from_record(&r)) {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!("Skipping space {}: {}", space.space_id, e);
                report.unreadable.push((space.nodes_dir.clone(), e));
                continue;
            }
        };
        if !info.matches(
            options.space_filter.as_deref(),
            options.user_filter.as_deref(),
        ) {
            continue;
        }
        tracing::info!("Dumping space {} ({})", info.name, space.space_id);

        if options.info_only {
            report.spaces.push(SpaceDump {
                space,
                info,
                entries: Vec::new(),
                resolve_issues: 0,
                from_checkpoint: false,
            });
            continue;
        }

        let resolution = {
            let resolver =
                TreeResolver::new(&space, checkpoints, &options.checkpoint_prefix, &info.user);
            if options.deep {
                resolver.resolve_space_deep()
            } else {
                resolver.resolve_space()
            }
        };
        match resolution {
            Ok(resolution) => report.spaces.push(dump_space(space, info, resolution, options)),
            Err(e) => {
                tracing::warn!("Skipping space {}: {}", space.space_id, e);
                report.unreadable.push((space.nodes_dir.clone(), e));
            }
        }
    }
    Ok(report)
}

fn dump_space(
    space: SpaceDir,
    info: SpaceInfo,
    resolution: SpaceResolution,
    options: &DumpOptions,
) -> SpaceDump {
    let copy_root = options
        .output
        .join(&info.space_type)
        .join(info.display_name());
    let mut entries = Vec::with_capacity(resolution.mapping.len());

    for (name, file) in &resolution.mapping {
        let blob = blob_location(&space, file);
        let blob_exists = blob.as_deref().map(Path::is_file).unwrap_or(false);
        let mut entry = DumpEntry {
            name: name.clone(),
            parent_path: file.parent_path.clone(),
            blob_id: file.blob_id.clone(),
            blob_exists,
            copied_to: None,
            copy_error: None,
        };

        if let (Some(blob), true, false) = (blob, blob_exists, options.list_only) {
            match destination(&copy_root, &file.parent_path, name) {
                Some(dest) => match copy_blob(&blob, &dest) {
                    Ok(()) => entry.copied_to = Some(dest),
                    Err(e) => {
                        tracing::warn!("Failed to copy {}: {}", entry.logical_path(), e);
                        entry.copy_error = Some(e.to_string());
                    }
                },
                None => tracing::warn!(
                    "Not copying {}: path escapes the output directory",
                    entry.logical_path()
                ),
            }
        }
        entries.push(entry);
    }

    SpaceDump {
        space,
        info,
        entries,
        resolve_issues: resolution.issues.len(),
        from_checkpoint: resolution.mapping_source == crate::checkpoint::CheckpointSource::Hit,
    }
}

fn copy_blob(blob: &Path, dest: &Path) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(blob, dest)?;
    Ok(())
}

fn blob_location(space: &SpaceDir, file: &ResolvedFile) -> Option<PathBuf> {
    match space.blob_path(&file.blob_id) {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::warn!("{}", e);
            None
        }
    }
}

/// `root/<parent path>/<name>`, or `None` if the logical path would leave `root`.
pub fn destination(root: &Path, parent_path: &str, name: &str) -> Option<PathBuf> {
    let mut dest = root.to_path_buf();
    for component in Path::new(parent_path).join(name).components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => dest.push(part),
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if dest == root {
        None
    } else {
        Some(dest)
    }
}
