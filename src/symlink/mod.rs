//! Symlink tree audit and repair
//!
//! Every node record with a name, a parent id, and a file/directory type
//! should have a symlink at `<nodes>/<parent-shard>/<name>` pointing back to
//! its own shard directory. [`audit`] classifies what is on disk; [`repair`]
//! replaces anything divergent and then re-reads the link to confirm it.

pub mod auditor;
pub mod expected;
pub mod tally;

pub use auditor::{AuditMode, AuditSummary, Finding, SymlinkAuditor};
pub use expected::ExpectedLink;
pub use tally::SymlinkTally;

use crate::error::StoreError;
use crate::store::Record;
use crate::types::{Identifier, NodeKind};
use std::fs::DirBuilder;
use std::io::ErrorKind;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};

/// Mode for directories created while repairing.
pub const REPAIR_DIR_MODE: u32 = 0o700;

/// Record fields the link is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSubject {
    pub name: String,
    pub parent_id: Identifier,
    pub kind: NodeKind,
}

impl LinkSubject {
    /// `None` when the record lacks a name, a parent id, or a known type;
    /// such records take no part in the audit.
    pub fn from_record(record: &Record) -> Result<Option<Self>, StoreError> {
        let name = record.name()?;
        let parent_id = record.parent_id()?;
        let kind = record.kind()?;
        if name == crate::types::NOT_AVAILABLE
            || parent_id.is_sentinel()
            || kind == NodeKind::Unknown
        {
            return Ok(None);
        }
        Ok(Some(LinkSubject {
            name,
            parent_id,
            kind,
        }))
    }

    pub fn expected(&self, record_dir: &Path) -> Result<ExpectedLink, StoreError> {
        ExpectedLink::compute(self.kind, record_dir, self.parent_id.as_str(), &self.name)
    }
}

/// State of a node's symlink relative to the expected target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymlinkStatus {
    Missing,
    /// A symlink with another target (`actual`), or a regular entry (`actual` is `None`).
    WrongTarget { actual: Option<PathBuf> },
    Correct,
}

/// What was found at the expected location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkObservation {
    /// Something exists there, following symlinks.
    pub exists: bool,
    pub is_symlink: bool,
    pub status: SymlinkStatus,
}

/// Audit of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReport {
    pub subject: LinkSubject,
    pub expected: ExpectedLink,
    pub observation: LinkObservation,
}

impl AuditReport {
    pub fn status(&self) -> &SymlinkStatus {
        &self.observation.status
    }
}

/// What a repair attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairOutcome {
    /// The link was already correct; nothing touched.
    AlreadyCorrect,
    /// A link was written and reads back with the expected target.
    Fixed { removed: Option<RemovedEntry> },
    /// A link was written but reads back differently (or not at all).
    Unverified { actual: Option<PathBuf> },
    /// Left untouched because something unexpected blocks the location.
    Skipped { reason: String },
}

impl RepairOutcome {
    /// Counts toward the fixed total.
    pub fn is_success(&self) -> bool {
        matches!(self, RepairOutcome::AlreadyCorrect | RepairOutcome::Fixed { .. })
    }
}

/// Entry removed from the link location before relinking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovedEntry {
    Symlink(PathBuf),
    File,
    Directory,
}

/// Inspect what exists at `expected.location`.
pub fn observe(expected: &ExpectedLink) -> Result<LinkObservation, StoreError> {
    let location = &expected.location;
    let exists = location.exists();
    let metadata = match std::fs::symlink_metadata(location) {
        Ok(metadata) => metadata,
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
            return Ok(LinkObservation {
                exists,
                is_symlink: false,
                status: SymlinkStatus::Missing,
            })
        }
        Err(e) => return Err(e.into()),
    };

    if !metadata.file_type().is_symlink() {
        return Ok(LinkObservation {
            exists,
            is_symlink: false,
            status: SymlinkStatus::WrongTarget { actual: None },
        });
    }

    let actual = std::fs::read_link(location)?;
    let status = if actual == expected.target {
        SymlinkStatus::Correct
    } else {
        SymlinkStatus::WrongTarget {
            actual: Some(actual),
        }
    };
    Ok(LinkObservation {
        exists,
        is_symlink: true,
        status,
    })
}

/// Classify the symlink of the record stored at `record_dir`.
/// `Ok(None)` means the record is not eligible for a link.
pub fn audit(record: &Record, record_dir: &Path) -> Result<Option<AuditReport>, StoreError> {
    let subject = match LinkSubject::from_record(record)? {
        Some(subject) => subject,
        None => return Ok(None),
    };
    let expected = subject.expected(record_dir)?;
    let observation = observe(&expected)?;
    Ok(Some(AuditReport {
        subject,
        expected,
        observation,
    }))
}

/// Bring the record's symlink to the expected state.
///
/// Returns the pre-repair audit together with the outcome so callers can
/// tally what existed before the change. `Ok(None)` for ineligible records.
pub fn repair(
    record: &Record,
    record_dir: &Path,
) -> Result<Option<(AuditReport, RepairOutcome)>, StoreError> {
    let report = match audit(record, record_dir)? {
        Some(report) => report,
        None => return Ok(None),
    };
    let outcome = repair_report(&report, record_dir)?;
    Ok(Some((report, outcome)))
}

fn repair_report(report: &AuditReport, record_dir: &Path) -> Result<RepairOutcome, StoreError> {
    if report.observation.status == SymlinkStatus::Correct {
        return Ok(RepairOutcome::AlreadyCorrect);
    }

    let removed = clear_location(&report.expected.location, &report.observation)?;

    let expected = if record_dir.exists() {
        report.expected.clone()
    } else {
        create_placeholder(report.subject.kind, record_dir)?;
        report.subject.expected(record_dir)?
    };

    let parent = match expected.location.parent() {
        Some(parent) => parent,
        None => {
            return Ok(RepairOutcome::Skipped {
                reason: format!("{} has no parent directory", expected.location.display()),
            })
        }
    };
    if let Err(e) = DirBuilder::new()
        .recursive(true)
        .mode(REPAIR_DIR_MODE)
        .create(parent)
    {
        let conflict = StoreError::conflict(parent, e);
        tracing::warn!("{}", conflict);
        return Ok(RepairOutcome::Skipped {
            reason: conflict.to_string(),
        });
    }

    let file_name = match expected.location.file_name() {
        Some(name) => name,
        None => {
            return Ok(RepairOutcome::Skipped {
                reason: format!("{} has no file name", expected.location.display()),
            })
        }
    };
    let link_path = dunce::canonicalize(parent)?.join(file_name);

    match std::os::unix::fs::symlink(&expected.target, &link_path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            if link_path.is_symlink() {
                tracing::info!("{} is already a symlink", link_path.display());
            } else {
                return Ok(RepairOutcome::Skipped {
                    reason: StoreError::conflict(&link_path, "occupied by another entry")
                        .to_string(),
                });
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(RepairOutcome::Skipped {
                reason: format!("{} appears to not exist: {}", parent.display(), e),
            });
        }
        Err(e) => {
            return Ok(RepairOutcome::Skipped {
                reason: StoreError::conflict(&link_path, e).to_string(),
            })
        }
    }

    let actual = std::fs::read_link(&link_path).ok();
    if actual.as_deref() == Some(expected.target.as_path()) {
        Ok(RepairOutcome::Fixed { removed })
    } else {
        Ok(RepairOutcome::Unverified { actual })
    }
}

/// Remove whatever occupies the link location. Only the location itself is
/// removed, never an intermediate path segment.
fn clear_location(
    location: &Path,
    observation: &LinkObservation,
) -> Result<Option<RemovedEntry>, StoreError> {
    match &observation.status {
        SymlinkStatus::Missing | SymlinkStatus::Correct => Ok(None),
        SymlinkStatus::WrongTarget { actual: Some(actual) } => {
            tracing::info!("Replacing symlink {} -> {}", location.display(), actual.display());
            std::fs::remove_file(location)?;
            Ok(Some(RemovedEntry::Symlink(actual.clone())))
        }
        SymlinkStatus::WrongTarget { actual: None } => {
            tracing::warn!("Removing current not-symlink {}", location.display());
            if std::fs::symlink_metadata(location)?.is_dir() {
                std::fs::remove_dir_all(location)?;
                Ok(Some(RemovedEntry::Directory))
            } else {
                std::fs::remove_file(location)?;
                Ok(Some(RemovedEntry::File))
            }
        }
    }
}

/// Create an empty stand-in for a node whose own entry is missing: a
/// directory for directory nodes, an empty file for file nodes.
fn create_placeholder(kind: NodeKind, record_dir: &Path) -> Result<(), StoreError> {
    tracing::info!("Creating placeholder {}", record_dir.display());
    match kind {
        NodeKind::Directory => DirBuilder::new()
            .recursive(true)
            .mode(REPAIR_DIR_MODE)
            .create(record_dir)?,
        _ => {
            std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(false)
                .open(record_dir)?;
        }
    }
    Ok(())
}
