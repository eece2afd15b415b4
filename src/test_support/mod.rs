//! Shared test fixtures: an in-memory file provider, a canned native
//! resolver, and small graph-building helpers.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;

use crate::checker::{CheckVerdict, NativeResolver, ResolvedDependency, TopLevelAdder};
use crate::graph::{discover, ManifestGraph};
use crate::provider::{DirEntry, FileProvider};

/// In-memory [`FileProvider`] backed by a path -> content map.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    files: Mutex<BTreeMap<String, String>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        MemoryProvider::default()
    }

    /// Builder-style file insertion.
    pub fn with_file(self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(path.into(), content.into());
        self
    }

    /// Snapshot of a file's current content.
    pub fn file(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }
}

impl FileProvider for MemoryProvider {
    fn read(&self, path: &str) -> Result<Option<String>> {
        Ok(self.files.lock().unwrap().get(path).cloned())
    }

    fn list(&self, dir: &str) -> Result<Vec<DirEntry>> {
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };

        // Derive entries from stored paths: the component after the
        // prefix, a directory when more components follow.
        let mut entries: BTreeMap<String, bool> = BTreeMap::new();
        for path in self.files.lock().unwrap().keys() {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            match rest.split_once('/') {
                Some((name, _)) => {
                    entries.insert(name.to_string(), true);
                }
                None => {
                    entries.entry(rest.to_string()).or_insert(false);
                }
            }
        }

        Ok(entries
            .into_iter()
            .map(|(name, is_dir)| DirEntry { name, is_dir })
            .collect())
    }

    fn write(&self, path: &str, content: &str) -> Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
        Ok(())
    }
}

/// Discover a graph from an in-memory fixture, panicking on failure.
pub fn graph_from<P: FileProvider>(provider: &P, roots: &[&str]) -> ManifestGraph {
    discover(provider, roots).expect("fixture graph should discover cleanly")
}

/// [`NativeResolver`] with canned per-target dependency sets.
#[derive(Debug, Default)]
pub struct StaticResolver {
    targets: BTreeMap<String, Vec<ResolvedDependency>>,
    verdict: Option<CheckVerdict>,
}

impl StaticResolver {
    pub fn new() -> Self {
        StaticResolver::default()
    }

    /// Set the dependency set returned for `target`. Pairs are
    /// `(name, version)`.
    pub fn with_target(mut self, target: &str, deps: &[(&str, &str)]) -> Self {
        self.targets.insert(
            target.to_string(),
            deps.iter()
                .map(|(name, version)| ResolvedDependency {
                    name: (*name).to_string(),
                    version: (*version).to_string(),
                })
                .collect(),
        );
        self
    }

    /// Force every `validate` call to return `verdict`.
    pub fn with_verdict(mut self, verdict: CheckVerdict) -> Self {
        self.verdict = Some(verdict);
        self
    }
}

impl NativeResolver for StaticResolver {
    fn resolved_dependencies(
        &self,
        _graph: &ManifestGraph,
        target: &str,
        requested: &[ResolvedDependency],
    ) -> Result<Vec<ResolvedDependency>> {
        let mut deps = self.targets.get(target).cloned().unwrap_or_default();
        for req in requested {
            if let Some(dep) = deps
                .iter_mut()
                .find(|d| d.name.eq_ignore_ascii_case(&req.name))
            {
                dep.version = req.version.clone();
            }
        }
        Ok(deps)
    }

    fn validate(
        &self,
        _graph: &ManifestGraph,
        _target: &str,
        _timeout: Duration,
    ) -> Result<CheckVerdict> {
        Ok(self.verdict.unwrap_or(CheckVerdict::Coherent))
    }
}

/// [`TopLevelAdder`] that records calls and answers a fixed verdict.
#[derive(Debug)]
pub struct RecordingAdder {
    succeed: bool,
    pub calls: Mutex<Vec<(String, String, String)>>,
}

impl RecordingAdder {
    pub fn new(succeed: bool) -> Self {
        RecordingAdder {
            succeed,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl TopLevelAdder for RecordingAdder {
    fn add_top_level(&self, manifest_path: &str, name: &str, version: &str) -> Result<bool> {
        self.calls.lock().unwrap().push((
            manifest_path.to_string(),
            name.to_string(),
            version.to_string(),
        ));
        Ok(self.succeed)
    }
}
