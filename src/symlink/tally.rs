//! Aggregate symlink counters.

use serde::Serialize;

/// Counts accumulated over an audit or repair run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SymlinkTally {
    /// Something exists at the expected location (following links).
    pub exists: usize,
    /// The expected location holds a symlink.
    pub actual: usize,
    /// Records that should have a symlink.
    pub theoretical: usize,
    /// Repairs that read back correctly, including links that were already correct.
    pub fixed: usize,
    /// Records ignored for lacking name, parent id, or type.
    pub ineligible: usize,
    /// Records that could not be audited (decode or I/O failure).
    pub errors: usize,
}

impl SymlinkTally {
    /// The three existence counters agree.
    pub fn is_consistent(&self) -> bool {
        self.exists == self.actual && self.actual == self.theoretical
    }

    pub fn merge(&mut self, other: &SymlinkTally) {
        self.exists += other.exists;
        self.actual += other.actual;
        self.theoretical += other.theoretical;
        self.fixed += other.fixed;
        self.ineligible += other.ineligible;
        self.errors += other.errors;
    }
}
