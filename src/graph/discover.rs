//! Fixed-point graph discovery.
//!
//! Maintains a working set initialized to the roots; each round expands
//! every not-yet-expanded file into candidate edges, fetches the new
//! targets concurrently, and repeats until an iteration fetches nothing.
//! Membership in the file set is the cycle guard, so cyclic path
//! references terminate.

use std::collections::{BTreeSet, HashSet};

use rayon::prelude::*;

use crate::core::manifest::{FileRole, ManifestFile};
use crate::graph::edges::{self, CandidateEdge, EdgeKind};
use crate::graph::errors::DiscoverError;
use crate::graph::root;
use crate::graph::ManifestGraph;
use crate::provider::FileProvider;
use crate::util::paths;

/// Discover the manifest graph reachable from `roots`.
///
/// Unreachable required paths are collected across the whole traversal and
/// raised once at the end, so the caller sees every broken edge at once.
pub fn discover<P: FileProvider>(
    provider: &P,
    roots: &[&str],
) -> Result<ManifestGraph, DiscoverError> {
    let root_paths: BTreeSet<String> = roots.iter().map(|r| paths::clean(r)).collect();

    let mut graph = ManifestGraph::default();
    let mut pending: Vec<String> = Vec::new();
    let mut unreachable: BTreeSet<String> = BTreeSet::new();

    for path in &root_paths {
        let content = read(provider, path)?
            .ok_or_else(|| DiscoverError::RootNotFound { path: path.clone() })?;
        let file = parse(path, content, FileRole::Primary)?;
        if graph.insert(file) {
            pending.push(path.clone());
        }
    }

    while !pending.is_empty() {
        let candidates = frontier_edges(provider, &graph, &pending)?;
        pending.clear();

        tracing::debug!(count = candidates.len(), "discovery round frontier");

        // Fan the fetches out; the dedup set is only touched by this
        // thread when the round's results are merged below.
        let fetched: Vec<(CandidateEdge, Result<Option<String>, DiscoverError>)> = candidates
            .into_par_iter()
            .map(|edge| {
                let result = read(provider, &edge.path);
                (edge, result)
            })
            .collect();

        for (edge, result) in fetched {
            let Some(content) = result? else {
                if edge.required {
                    unreachable.insert(edge.path);
                } else {
                    tracing::debug!(path = %edge.path, "optional path dependency missing; dropped");
                }
                continue;
            };

            let role = classify(&root_paths, &edge.path);
            let file = parse(&edge.path, content, role)?;
            let search_root = edge.kind == EdgeKind::PathDep && file.is_workspace_member();
            let path = file.path().to_string();

            if graph.insert(file) {
                pending.push(path.clone());
            }

            // A path dependency that inherits from a workspace needs its
            // root in the set so the member manifest resolves.
            if search_root {
                let member = graph.get(&path).ok_or_else(|| DiscoverError::Provider {
                    path: path.clone(),
                    message: "file vanished from graph during discovery".into(),
                })?;
                if let Some((root_path, root_content)) =
                    root::find_workspace_root_via_provider(provider, member)
                {
                    if !graph.contains(&root_path) {
                        let role = classify(&root_paths, &root_path);
                        let root_file = parse(&root_path, root_content, role)?;
                        if graph.insert(root_file) {
                            pending.push(root_path);
                        }
                    }
                }
            }
        }

        pending.sort();
        pending.dedup();
    }

    if !unreachable.is_empty() {
        return Err(DiscoverError::PathsUnreachable {
            paths: unreachable.into_iter().collect(),
        });
    }

    Ok(graph)
}

/// Candidate edges from the files expanded this round, deduplicated by
/// path. A path required by any edge stays required; the first edge kind
/// seen wins.
fn frontier_edges<P: FileProvider>(
    provider: &P,
    graph: &ManifestGraph,
    pending: &[String],
) -> Result<Vec<CandidateEdge>, DiscoverError> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates: Vec<CandidateEdge> = Vec::new();

    for path in pending {
        let Some(file) = graph.get(path) else {
            continue;
        };

        let mut file_edges = edges::workspace_member_edges(provider, file)?;
        file_edges.extend(edges::path_dependency_edges(file));

        for edge in file_edges {
            // Self-edge guard: path normalization can legitimately land
            // back on the declaring file.
            if edge.path == *path || graph.contains(&edge.path) {
                continue;
            }
            if seen.insert(edge.path.clone()) {
                candidates.push(edge);
            } else if edge.required {
                if let Some(existing) = candidates.iter_mut().find(|c| c.path == edge.path) {
                    existing.required = true;
                }
            }
        }
    }

    Ok(candidates)
}

fn classify(roots: &BTreeSet<String>, path: &str) -> FileRole {
    if roots.contains(path) {
        FileRole::Primary
    } else {
        FileRole::Support
    }
}

fn read<P: FileProvider>(provider: &P, path: &str) -> Result<Option<String>, DiscoverError> {
    provider.read(path).map_err(|e| DiscoverError::Provider {
        path: path.to_string(),
        message: e.to_string(),
    })
}

fn parse(path: &str, content: String, role: FileRole) -> Result<ManifestFile, DiscoverError> {
    ManifestFile::new(path, content, role).map_err(|source| DiscoverError::NotParseable {
        path: path.to_string(),
        source,
    })
}
