//! External collaborators: the native resolver / consistency checker and
//! the native "add top-level dependency" tool.
//!
//! The core computes edits from its own index, but candidate dependency
//! sets per build target and post-edit coherence checks come from native
//! tooling behind these traits. Implementations here: a declaration-backed
//! resolver for offline use and a subprocess-backed one for real native
//! tools.

pub mod declared;
pub mod process;

pub use declared::DeclaredResolver;
pub use process::{CommandAdder, CommandResolver};

use std::time::Duration;

use anyhow::Result;

use crate::graph::ManifestGraph;

/// The build target every graph resolves for even without target-specific
/// sections.
pub const DEFAULT_TARGET: &str = "default";

/// One entry of a target's resolved dependency set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    /// Dependency name
    pub name: String,

    /// Resolved version literal
    pub version: String,
}

/// Verdict of a post-edit consistency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckVerdict {
    /// The staged graph resolves coherently.
    Coherent,

    /// The native resolver reports an incoherent graph.
    Incoherent,

    /// The check did not finish inside the caller-supplied timeout.
    /// Treated as a resolution failure, not a crash.
    TimedOut,
}

/// Native resolver and consistency checker for one manifest set.
pub trait NativeResolver: Sync {
    /// The resolved dependency set for one build target, with `requested`
    /// versions taking precedence over whatever is currently declared.
    fn resolved_dependencies(
        &self,
        graph: &ManifestGraph,
        target: &str,
        requested: &[ResolvedDependency],
    ) -> Result<Vec<ResolvedDependency>>;

    /// Re-validate a (staged) graph for one build target.
    fn validate(&self, graph: &ManifestGraph, target: &str, timeout: Duration)
        -> Result<CheckVerdict>;
}

/// Native tool that adds a brand-new top-level dependency declaration.
/// Used only in the centralized-pin fallback path.
pub trait TopLevelAdder {
    /// Returns whether the tool reported success.
    fn add_top_level(&self, manifest_path: &str, name: &str, version: &str) -> Result<bool>;
}

/// Every build target named anywhere in the graph, plus the default one.
pub fn build_targets(graph: &ManifestGraph) -> Vec<String> {
    use crate::core::declaration::DeclScope;

    let mut targets = std::collections::BTreeSet::new();
    targets.insert(DEFAULT_TARGET.to_string());
    for decl in graph.declarations() {
        if let DeclScope::TargetSpecific(id) = decl.scope {
            targets.insert(id);
        }
    }
    targets.into_iter().collect()
}
