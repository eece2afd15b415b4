//! Manifest graph discovery.
//!
//! Starting from one or more root manifests, discovery performs a
//! fixed-point traversal that expands workspace membership globs and local
//! path references into additional manifest files until no new files are
//! found.

pub mod discover;
pub mod edges;
pub mod errors;
pub mod root;

pub use discover::discover;
pub use errors::DiscoverError;
pub use root::owning_workspace_root;

use std::collections::BTreeMap;

use crate::core::declaration::DependencyDeclaration;
use crate::core::manifest::{FileRole, ManifestFile};
use crate::index;

/// The fixed-point result of discovery: every manifest participating in
/// one logical dependency graph, keyed by normalized path.
#[derive(Debug, Default)]
pub struct ManifestGraph {
    files: BTreeMap<String, ManifestFile>,
}

impl ManifestGraph {
    /// Number of files in the graph.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Look up a file by normalized path.
    pub fn get(&self, path: &str) -> Option<&ManifestFile> {
        self.files.get(path)
    }

    /// Whether a path is already part of the graph.
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// All files, in deterministic path order.
    pub fn files(&self) -> impl Iterator<Item = &ManifestFile> {
        self.files.values()
    }

    /// All file paths, in deterministic order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Files classified as primary (independently updatable).
    pub fn primary_files(&self) -> impl Iterator<Item = &ManifestFile> {
        self.files
            .values()
            .filter(|f| f.role() == FileRole::Primary)
    }

    /// Index every file into declarations, in deterministic order.
    pub fn declarations(&self) -> Vec<DependencyDeclaration> {
        self.files
            .values()
            .flat_map(index::index_manifest)
            .collect()
    }

    /// Insert a file if its path is not already present. The first
    /// classification wins; only original roots are inserted as primary.
    pub(crate) fn insert(&mut self, file: ManifestFile) -> bool {
        if self.files.contains_key(file.path()) {
            return false;
        }
        self.files.insert(file.path().to_string(), file);
        true
    }

    /// Replace the content of a file in the graph. Used by the patcher
    /// when staging edits in memory.
    pub(crate) fn set_content(&mut self, path: &str, content: String) -> anyhow::Result<()> {
        let file = self
            .files
            .get_mut(path)
            .ok_or_else(|| anyhow::anyhow!("file not in graph: {path}"))?;
        file.set_content(content)
            .map_err(|e| anyhow::anyhow!("edited manifest `{path}` no longer parses: {e}"))
    }
}
