//! Candidate edge extraction.
//!
//! A manifest contributes two kinds of edges to discovery: workspace
//! member paths (possibly globbed, expanded against the provider's
//! directory listings) and local path references scattered across
//! dependency, target-specific, and replacement/patch sections.

use glob::Pattern;
use toml::Value;

use crate::core::manifest::{ManifestFile, MANIFEST_NAME};
use crate::graph::errors::DiscoverError;
use crate::index;
use crate::provider::FileProvider;
use crate::util::paths;

/// How an edge was declared, which decides whether a workspace-root search
/// is performed for the fetched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Listed under `[workspace].members`.
    Member,

    /// Referenced through a `path` key in a dependency entry.
    PathDep,
}

/// A candidate edge to a manifest not yet fetched.
#[derive(Debug, Clone)]
pub struct CandidateEdge {
    /// Repository-relative manifest path, normalized
    pub path: String,

    /// Whether failure to fetch the target is fatal
    pub required: bool,

    /// Member or path-dependency edge
    pub kind: EdgeKind,
}

/// Path-dependency edges from every dependency-bearing section.
///
/// An edge is required unless the entry also names a `git` alternative
/// source; optional edges whose targets are missing are silently dropped.
pub fn path_dependency_edges(file: &ManifestFile) -> Vec<CandidateEdge> {
    index::raw_entries(file)
        .into_iter()
        .filter_map(|entry| {
            let path = entry.path?;
            Some(CandidateEdge {
                path: paths::join(file.directory(), &format!("{path}/{MANIFEST_NAME}")),
                required: !entry.git,
                kind: EdgeKind::PathDep,
            })
        })
        .collect()
}

/// Workspace member edges, with globs expanded against the provider and
/// the exclusion list honored.
///
/// A `[workspace]` section without a `members` array contributes its path
/// dependencies instead, so bare workspace roots still pull in everything
/// they reference.
pub fn workspace_member_edges<P: FileProvider>(
    provider: &P,
    file: &ManifestFile,
) -> Result<Vec<CandidateEdge>, DiscoverError> {
    let Some(workspace) = file.doc().get("workspace") else {
        return Ok(Vec::new());
    };

    let Some(members) = workspace.get("members") else {
        return Ok(path_dependency_edges(file));
    };

    let member_patterns = string_array(members);
    if member_patterns.is_empty() {
        return Ok(Vec::new());
    }

    let exclusions: Vec<Pattern> = workspace
        .get("exclude")
        .map(string_array)
        .unwrap_or_default()
        .iter()
        .filter_map(|raw| Pattern::new(&paths::clean(raw)).ok())
        .collect();

    let mut edges = Vec::new();
    for pattern in member_patterns {
        let dirs = if pattern.split('/').any(paths::has_glob) {
            expand_member_glob(provider, file.directory(), &pattern)?
        } else {
            vec![paths::join(file.directory(), &pattern)]
        };

        for dir in dirs {
            let member_rel = relative_to(&dir, file.directory());
            if exclusions.iter().any(|ex| ex.matches(&member_rel)) {
                tracing::debug!(member = %member_rel, file = %file.path(), "workspace member excluded");
                continue;
            }
            edges.push(CandidateEdge {
                path: paths::join(&dir, MANIFEST_NAME),
                required: true,
                kind: EdgeKind::Member,
            });
        }
    }

    Ok(edges)
}

/// Expand one globbed member pattern component-by-component against the
/// provider's directory listings. Only directories participate.
fn expand_member_glob<P: FileProvider>(
    provider: &P,
    base_dir: &str,
    pattern: &str,
) -> Result<Vec<String>, DiscoverError> {
    let full = paths::join(base_dir, pattern);

    let mut dirs: Vec<String> = vec![String::new()];
    for component in full.split('/') {
        if !paths::has_glob(component) {
            dirs = dirs
                .into_iter()
                .map(|d| paths::join(&d, component))
                .collect();
            continue;
        }

        let matcher = Pattern::new(component).map_err(|e| DiscoverError::Provider {
            path: full.clone(),
            message: format!("invalid member glob `{pattern}`: {e}"),
        })?;

        let mut expanded = Vec::new();
        for dir in &dirs {
            let entries = provider.list(dir).map_err(|e| DiscoverError::Provider {
                path: dir.clone(),
                message: e.to_string(),
            })?;
            for entry in entries {
                if entry.is_dir && matcher.matches(&entry.name) {
                    expanded.push(paths::join(dir, &entry.name));
                }
            }
        }
        dirs = expanded;
    }

    dirs.sort();
    dirs.dedup();
    Ok(dirs)
}

fn string_array(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        _ => Vec::new(),
    }
}

fn relative_to(path: &str, base: &str) -> String {
    if base.is_empty() {
        path.to_string()
    } else {
        path.strip_prefix(&format!("{base}/"))
            .unwrap_or(path)
            .to_string()
    }
}
