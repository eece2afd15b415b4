//! Drydock - automated dependency version upgrades across manifest graphs.
//!
//! This crate discovers the set of manifest files that participate in one
//! logical dependency graph (workspace roots, members, path dependencies,
//! replacement sections), indexes every declaration of a dependency across
//! that graph, and computes the minimal set of edits needed to move one
//! dependency to a new version.

pub mod checker;
pub mod core;
pub mod graph;
pub mod index;
pub mod ops;
pub mod patch;
pub mod provider;
pub mod resolve;
pub mod util;

/// Test utilities and mocks for Drydock unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides an in-memory file provider and fixture
/// builders for manifest graphs.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    declaration::{DeclScope, DependencyDeclaration, VersionSpec},
    edit::{ChangedFile, Edit, EditKind, NodeLocator},
    manifest::{FileRole, ManifestFile, MANIFEST_NAME},
};

pub use crate::graph::{discover, DiscoverError, ManifestGraph};
pub use crate::patch::{Outcome, PatchRequest, PatchResult, VersionPatcher};
pub use crate::provider::{FileProvider, LocalProvider};
pub use crate::resolve::{resolve_declaration, Resolution};
