//! The version patcher.
//!
//! Given a dependency name and a requested version, locates every
//! declaration site across the discovered graph that must change, detects
//! centralized-pinning and conflicting-peer scenarios, and produces a
//! minimal edit set applied snapshot-to-snapshot.

pub mod classify;
pub mod errors;
mod patcher;
mod pins;

pub use errors::PatchError;
pub use patcher::VersionPatcher;

use crate::core::edit::{ChangedFile, Edit};

/// Overall outcome of one patch invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Edits were produced and applied.
    Updated,

    /// Every usable declaration already carried the requested version.
    AlreadyCorrect,

    /// Only unsupported range syntax was found, or a staged change was
    /// rejected by the consistency check.
    NotSupported,

    /// The dependency is absent from every target's resolved graph.
    NotFound,
}

impl Outcome {
    fn rank(self) -> u8 {
        match self {
            Outcome::Updated => 3,
            Outcome::AlreadyCorrect => 2,
            Outcome::NotSupported => 1,
            Outcome::NotFound => 0,
        }
    }

    /// Combine two outcomes, keeping the higher-priority one.
    pub fn prefer(self, other: Outcome) -> Outcome {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }
}

/// One requested version move.
#[derive(Debug, Clone)]
pub struct PatchRequest {
    /// Dependency name (matched case-insensitively)
    pub name: String,

    /// Known previous version; `None` selects peer mode
    pub previous: Option<String>,

    /// Requested version
    pub new_version: String,

    /// Whether the dependency is transitive (routed to the centralized
    /// pin table, or the native add tool as a fallback)
    pub transitive: bool,
}

/// Result of one patch invocation.
#[derive(Debug)]
pub struct PatchResult {
    /// Overall outcome, highest priority across all declaration sites
    pub outcome: Outcome,

    /// The edits that were applied
    pub edits: Vec<Edit>,

    /// Files whose content actually changed, with both snapshots
    pub changed: Vec<ChangedFile>,
}

impl PatchResult {
    fn unchanged(outcome: Outcome) -> Self {
        PatchResult {
            outcome,
            edits: Vec::new(),
            changed: Vec::new(),
        }
    }
}
