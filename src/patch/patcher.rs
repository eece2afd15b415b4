//! Patch computation and application.

use std::collections::{BTreeMap, BTreeSet};

use crate::checker::{build_targets, NativeResolver, ResolvedDependency, TopLevelAdder};
use crate::core::declaration::DependencyDeclaration;
use crate::core::edit::{self, ChangedFile, Edit, EditKind, NodeLocator};
use crate::graph::ManifestGraph;
use crate::patch::classify::{self, Classification};
use crate::patch::pins::{self, PinPlan};
use crate::patch::{Outcome, PatchError, PatchRequest, PatchResult};
use crate::resolve::{resolve_declaration, Resolution};

/// Computes and applies the edit set for one dependency move.
pub struct VersionPatcher<'a> {
    resolver: &'a dyn NativeResolver,
    adder: Option<&'a dyn TopLevelAdder>,
}

impl<'a> VersionPatcher<'a> {
    /// Create a patcher over the given native resolver.
    pub fn new(resolver: &'a dyn NativeResolver) -> Self {
        VersionPatcher {
            resolver,
            adder: None,
        }
    }

    /// Attach a native add tool for the centralized-pin fallback path.
    pub fn with_adder(mut self, adder: &'a dyn TopLevelAdder) -> Self {
        self.adder = Some(adder);
        self
    }

    /// Patch one dependency across the graph, staging the resulting
    /// content in `graph`.
    ///
    /// Conflicts and no-updatable-target conditions are detected before
    /// any edit is applied; on error the graph is untouched.
    pub fn patch(
        &self,
        graph: &mut ManifestGraph,
        request: &PatchRequest,
    ) -> Result<PatchResult, PatchError> {
        tracing::info!(
            name = request.name,
            new_version = request.new_version,
            transitive = request.transitive,
            "patching dependency"
        );

        if request.transitive {
            self.patch_transitive(graph, request)
        } else {
            self.patch_top_level(graph, request)
        }
    }

    fn patch_top_level(
        &self,
        graph: &mut ManifestGraph,
        request: &PatchRequest,
    ) -> Result<PatchResult, PatchError> {
        let declarations = graph.declarations();

        let updatable = self.updatable_targets(graph, &request.name)?;
        if updatable.is_empty() {
            tracing::warn!(
                name = request.name,
                "dependency absent from every target's resolved graph"
            );
            return Ok(PatchResult::unchanged(Outcome::NotFound));
        }

        let mut edits: BTreeMap<NodeLocator, Edit> = BTreeMap::new();
        let mut outcome = Outcome::NotFound;

        // Primary pass: every declaration of the requested dependency.
        for decl in declarations.iter().filter(|d| d.matches_name(&request.name)) {
            let Some((value, site)) = resolve_literal(graph, decl) else {
                continue;
            };

            match classify::classify(&value, request.previous.as_deref(), &request.new_version) {
                Classification::Unsupported => {
                    tracing::debug!(
                        name = decl.name,
                        value,
                        file = decl.file,
                        "range syntax left alone"
                    );
                    outcome = outcome.prefer(Outcome::NotSupported);
                }
                Classification::AlreadyCorrect => {
                    outcome = outcome.prefer(Outcome::AlreadyCorrect);
                }
                Classification::StaleExact | Classification::StalePeer => {
                    stage(&mut edits, set_edit(site, &value, &request.new_version))?;
                }
                Classification::Untouched => {}
            }
        }

        // Peer pass: recompute every other dependency's resolved version
        // per target with the requested move in place, and lift stale
        // declared peers to match. Targets that disagree abort the patch.
        let peer_versions = self.peer_versions(graph, request, &updatable)?;
        for (name, versions) in peer_versions {
            let decls: Vec<&DependencyDeclaration> = declarations
                .iter()
                .filter(|d| d.matches_name(&name))
                .collect();
            if decls.is_empty() {
                continue;
            }

            let stale_versions: BTreeSet<&String> = versions
                .iter()
                .map(|(_, v)| v)
                .filter(|v| {
                    decls.iter().any(|d| {
                        resolve_literal(graph, d).is_some_and(|(value, _)| {
                            classify::classify(&value, None, v) == Classification::StalePeer
                        })
                    })
                })
                .collect();
            if stale_versions.is_empty() {
                continue;
            }

            let distinct: BTreeSet<&String> = versions.iter().map(|(_, v)| v).collect();
            if distinct.len() > 1 {
                return Err(PatchError::VersionConflict { name, versions });
            }

            let target_version = versions[0].1.clone();
            for decl in decls {
                let Some((value, site)) = resolve_literal(graph, decl) else {
                    continue;
                };
                if classify::classify(&value, None, &target_version) == Classification::StalePeer {
                    stage(&mut edits, set_edit(site, &value, &target_version))?;
                }
            }
        }

        if edits.is_empty() {
            return Ok(PatchResult::unchanged(outcome));
        }

        let edits: Vec<Edit> = edits.into_values().collect();
        let changed = apply(graph, &edits)?;
        Ok(PatchResult {
            outcome: Outcome::Updated,
            edits,
            changed,
        })
    }

    fn patch_transitive(
        &self,
        graph: &mut ManifestGraph,
        request: &PatchRequest,
    ) -> Result<PatchResult, PatchError> {
        // Same guard as the top-level path: a dependency absent from every
        // target's resolved graph has nothing to pin against.
        let updatable = self.updatable_targets(graph, &request.name)?;
        if updatable.is_empty() {
            tracing::warn!(
                name = request.name,
                "dependency absent from every target's resolved graph"
            );
            return Ok(PatchResult::unchanged(Outcome::NotFound));
        }

        match pins::plan_pin(graph, &request.name, &request.new_version) {
            PinPlan::AlreadyCorrect => Ok(PatchResult::unchanged(Outcome::AlreadyCorrect)),
            PinPlan::Unsupported => Ok(PatchResult::unchanged(Outcome::NotSupported)),
            PinPlan::Edits(edits) => {
                let changed = apply(graph, &edits)?;
                Ok(PatchResult {
                    outcome: Outcome::Updated,
                    edits,
                    changed,
                })
            }
            PinPlan::NoPinFile => self.add_top_level(graph, request),
        }
    }

    /// Fallback when no centralized pin structure exists: ask the native
    /// add tool to declare the dependency top-level instead. The tool
    /// writes outside this graph; success carries no changed-file pairs.
    fn add_top_level(
        &self,
        graph: &ManifestGraph,
        request: &PatchRequest,
    ) -> Result<PatchResult, PatchError> {
        let Some(path) = graph.primary_files().next().map(|f| f.path().to_string()) else {
            return Ok(PatchResult::unchanged(Outcome::NotFound));
        };
        let Some(adder) = self.adder else {
            tracing::warn!(
                name = request.name,
                "no pin table and no add tool configured"
            );
            return Ok(PatchResult::unchanged(Outcome::NotSupported));
        };

        match adder.add_top_level(&path, &request.name, &request.new_version) {
            Ok(true) => {
                tracing::info!(name = request.name, path, "added as top-level dependency");
                Ok(PatchResult::unchanged(Outcome::Updated))
            }
            Ok(false) => {
                tracing::warn!(name = request.name, path, "native add tool refused");
                Ok(PatchResult::unchanged(Outcome::NotSupported))
            }
            Err(error) => {
                tracing::warn!(name = request.name, %error, "native add tool failed");
                Ok(PatchResult::unchanged(Outcome::NotSupported))
            }
        }
    }

    /// Targets whose resolved graph contains the dependency at all.
    fn updatable_targets(
        &self,
        graph: &ManifestGraph,
        name: &str,
    ) -> Result<Vec<String>, PatchError> {
        let mut updatable = Vec::new();
        for target in build_targets(graph) {
            let deps = self
                .resolver
                .resolved_dependencies(graph, &target, &[])
                .map_err(PatchError::Resolver)?;
            if deps.iter().any(|d| d.name.eq_ignore_ascii_case(name)) {
                updatable.push(target);
            }
        }
        Ok(updatable)
    }

    /// Per-peer `(target, version)` pairs after the requested move, keyed
    /// by the peer's name as first seen.
    fn peer_versions(
        &self,
        graph: &ManifestGraph,
        request: &PatchRequest,
        targets: &[String],
    ) -> Result<BTreeMap<String, Vec<(String, String)>>, PatchError> {
        let requested = [ResolvedDependency {
            name: request.name.clone(),
            version: request.new_version.clone(),
        }];

        let mut peers: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();
        for target in targets {
            let deps = self
                .resolver
                .resolved_dependencies(graph, target, &requested)
                .map_err(PatchError::Resolver)?;
            for dep in deps {
                if dep.name.eq_ignore_ascii_case(&request.name) {
                    continue;
                }
                let key = peers
                    .keys()
                    .find(|k| k.eq_ignore_ascii_case(&dep.name))
                    .cloned()
                    .unwrap_or(dep.name);
                peers
                    .entry(key)
                    .or_default()
                    .push((target.clone(), dep.version));
            }
        }
        Ok(peers)
    }
}

/// Resolve a declaration down to an editable literal, logging and
/// skipping declarations whose property chain is broken.
fn resolve_literal(
    graph: &ManifestGraph,
    decl: &DependencyDeclaration,
) -> Option<(String, NodeLocator)> {
    match resolve_declaration(graph, decl) {
        Resolution::Literal { value, site } => Some((value, site)),
        Resolution::Unresolved { property } => {
            tracing::warn!(
                name = decl.name,
                file = decl.file,
                property,
                "version property undefined; declaration not patchable"
            );
            None
        }
        Resolution::Cycle { chain } => {
            tracing::warn!(
                name = decl.name,
                file = decl.file,
                chain = chain.join(" -> "),
                "version property cycle; declaration not patchable"
            );
            None
        }
    }
}

fn set_edit(site: NodeLocator, old: &str, new_version: &str) -> Edit {
    Edit {
        site,
        kind: EditKind::Set {
            old: old.to_string(),
            new: classify::replace_within_brackets(old, new_version),
        },
    }
}

/// Stage an edit, collapsing duplicates. Declarations sharing one
/// property site legitimately produce the same edit more than once;
/// contradicting edits at one site are a hard failure.
fn stage(edits: &mut BTreeMap<NodeLocator, Edit>, edit: Edit) -> Result<(), PatchError> {
    match edits.get(&edit.site) {
        None => {
            edits.insert(edit.site.clone(), edit);
            Ok(())
        }
        Some(existing) if *existing == edit => Ok(()),
        Some(existing) => Err(PatchError::Apply {
            path: edit.site.file.clone(),
            source: anyhow::anyhow!(
                "contradicting edits at `{}`: {:?} vs {:?}",
                edit.site.keys.join("."),
                existing.kind,
                edit.kind
            ),
        }),
    }
}

/// Apply a computed edit set to the graph, file by file, returning the
/// files whose content actually changed.
fn apply(graph: &mut ManifestGraph, edits: &[Edit]) -> Result<Vec<ChangedFile>, PatchError> {
    let mut by_file: BTreeMap<&str, Vec<Edit>> = BTreeMap::new();
    for edit in edits {
        by_file.entry(&edit.site.file).or_default().push(edit.clone());
    }

    let mut changed = Vec::new();
    for (path, file_edits) in by_file {
        let old_content = graph
            .get(path)
            .ok_or_else(|| PatchError::Apply {
                path: path.to_string(),
                source: anyhow::anyhow!("file not in graph"),
            })?
            .content()
            .to_string();

        let new_content =
            edit::apply_edits(&old_content, &file_edits).map_err(|source| PatchError::Apply {
                path: path.to_string(),
                source,
            })?;

        if new_content != old_content {
            graph
                .set_content(path, new_content.clone())
                .map_err(|source| PatchError::Apply {
                    path: path.to_string(),
                    source,
                })?;
            changed.push(ChangedFile {
                path: path.to_string(),
                old_content,
                new_content,
            });
        }
    }

    Ok(changed)
}
