//! Store-wide audit/repair run.

use crate::error::StoreError;
use crate::store::{record_dir, Record, SpaceDir, StoreArea, StoreLayout};
use crate::symlink::{audit, repair, AuditReport, RepairOutcome, SymlinkStatus, SymlinkTally};
use crate::tree::find_all_records;
use std::path::{Path, PathBuf};

/// Whether divergent links are only reported or also repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditMode {
    Audit,
    Repair,
}

/// A record worth reporting.
#[derive(Debug)]
pub enum Finding {
    /// Audit mode: the link is missing or wrong.
    Divergent { record: PathBuf, report: AuditReport },
    /// Repair mode: a repair was attempted.
    Repaired {
        record: PathBuf,
        report: AuditReport,
        outcome: RepairOutcome,
    },
    /// The record could not be processed.
    Failed { record: PathBuf, error: StoreError },
}

/// Totals plus per-record findings.
#[derive(Debug, Default)]
pub struct AuditSummary {
    pub tally: SymlinkTally,
    pub findings: Vec<Finding>,
    pub spaces: usize,
}

impl AuditSummary {
    /// Fold another run's totals and findings into this one.
    pub fn absorb(&mut self, other: AuditSummary) {
        self.tally.merge(&other.tally);
        self.findings.extend(other.findings);
        self.spaces += other.spaces;
    }
}

/// Walks every record of every space and audits (or repairs) its symlink.
#[derive(Debug, Clone, Copy)]
pub struct SymlinkAuditor {
    mode: AuditMode,
}

impl SymlinkAuditor {
    pub fn new(mode: AuditMode) -> Self {
        SymlinkAuditor { mode }
    }

    pub fn mode(&self) -> AuditMode {
        self.mode
    }

    /// Process every space of `area`. A space that cannot be walked is
    /// reported as a failure and the run moves on.
    pub fn run(&self, layout: &StoreLayout, area: StoreArea) -> Result<AuditSummary, StoreError> {
        let mut summary = AuditSummary::default();
        for space in layout.discover_spaces(area)? {
            match self.run_space(&space) {
                Ok(space_summary) => summary.absorb(space_summary),
                Err(error) => {
                    tracing::warn!("Skipping space {}: {}", space.space_id, error);
                    summary.tally.errors += 1;
                    summary.findings.push(Finding::Failed {
                        record: space.nodes_dir.clone(),
                        error,
                    });
                }
            }
        }
        Ok(summary)
    }

    /// Process every record of one space.
    pub fn run_space(&self, space: &SpaceDir) -> Result<AuditSummary, StoreError> {
        tracing::info!(
            space = %space.space_id,
            "Checking symlinks under {}",
            space.nodes_dir.display()
        );
        let mut summary = AuditSummary {
            spaces: 1,
            ..AuditSummary::default()
        };
        for record_path in &find_all_records(&space.nodes_dir)? {
            self.check_record(record_path, &mut summary);
        }
        Ok(summary)
    }

    /// Process one record file. Failures are recorded, never returned.
    pub fn check_record(&self, record_path: &Path, summary: &mut AuditSummary) {
        if let Err(error) = self.try_check_record(record_path, summary) {
            tracing::warn!("{}: {}", record_path.display(), error);
            summary.tally.errors += 1;
            summary.findings.push(Finding::Failed {
                record: record_path.to_path_buf(),
                error,
            });
        }
    }

    fn try_check_record(
        &self,
        record_path: &Path,
        summary: &mut AuditSummary,
    ) -> Result<(), StoreError> {
        let record = Record::decode_file(record_path)?;
        let dir = record_dir(record_path);

        match self.mode {
            AuditMode::Audit => {
                let Some(report) = audit(&record, &dir)? else {
                    summary.tally.ineligible += 1;
                    return Ok(());
                };
                count(&mut summary.tally, &report);
                if *report.status() != SymlinkStatus::Correct {
                    summary.findings.push(Finding::Divergent {
                        record: record_path.to_path_buf(),
                        report,
                    });
                }
            }
            AuditMode::Repair => {
                let Some((report, outcome)) = repair(&record, &dir)? else {
                    summary.tally.ineligible += 1;
                    return Ok(());
                };
                count(&mut summary.tally, &report);
                if outcome.is_success() {
                    summary.tally.fixed += 1;
                }
                if outcome != RepairOutcome::AlreadyCorrect {
                    summary.findings.push(Finding::Repaired {
                        record: record_path.to_path_buf(),
                        report,
                        outcome,
                    });
                }
            }
        }
        Ok(())
    }
}

fn count(tally: &mut SymlinkTally, report: &AuditReport) {
    tally.theoretical += 1;
    if report.observation.exists {
        tally.exists += 1;
    }
    if report.observation.is_symlink {
        tally.actual += 1;
    }
}
