//! Declaration-backed resolver.
//!
//! Derives candidate sets straight from the declaration index instead of
//! invoking native tooling. This sees exactly what is declared - direct,
//! workspace-aggregate, pinned, and target-specific entries with resolvable
//! versions - but not transitive dependencies, so transitive pinning flows
//! need a real native resolver behind [`CommandResolver`](super::CommandResolver).

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Result;

use crate::checker::{CheckVerdict, NativeResolver, ResolvedDependency, DEFAULT_TARGET};
use crate::core::declaration::DeclScope;
use crate::graph::ManifestGraph;
use crate::resolve::{resolve_declaration, Resolution};

/// Offline [`NativeResolver`] over the declaration index.
#[derive(Debug, Default)]
pub struct DeclaredResolver;

impl DeclaredResolver {
    /// Create a declaration-backed resolver.
    pub fn new() -> Self {
        DeclaredResolver
    }
}

impl NativeResolver for DeclaredResolver {
    fn resolved_dependencies(
        &self,
        graph: &ManifestGraph,
        target: &str,
        requested: &[ResolvedDependency],
    ) -> Result<Vec<ResolvedDependency>> {
        // Keyed by lowercased name; the first scope-visible declaration
        // wins, so direct entries shadow aggregated ones in path order.
        let mut resolved: BTreeMap<String, ResolvedDependency> = BTreeMap::new();

        for decl in graph.declarations() {
            let visible = match &decl.scope {
                DeclScope::Direct
                | DeclScope::WorkspaceAggregate
                | DeclScope::CentrallyPinned => true,
                DeclScope::TargetSpecific(id) => id == target && target != DEFAULT_TARGET,
                DeclScope::Replacement | DeclScope::Patch => false,
            };
            if !visible {
                continue;
            }

            let Resolution::Literal { value, .. } = resolve_declaration(graph, &decl) else {
                continue;
            };

            resolved
                .entry(decl.name.to_ascii_lowercase())
                .or_insert(ResolvedDependency {
                    name: decl.name,
                    version: value,
                });
        }

        for req in requested {
            if let Some(entry) = resolved.get_mut(&req.name.to_ascii_lowercase()) {
                entry.version = req.version.clone();
            }
        }

        Ok(resolved.into_values().collect())
    }

    fn validate(
        &self,
        _graph: &ManifestGraph,
        target: &str,
        _timeout: Duration,
    ) -> Result<CheckVerdict> {
        // No native resolution to contradict the index.
        tracing::debug!(target, "declared resolver validates trivially");
        Ok(CheckVerdict::Coherent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{graph_from, MemoryProvider};

    fn fixture() -> MemoryProvider {
        MemoryProvider::new()
            .with_file(
                "Manifest.toml",
                r#"
[workspace]
members = ["lib"]

[properties]
serde-version = "1.0.0"

[workspace.dependencies]
serde = "$(serde-version)"
"#,
            )
            .with_file(
                "lib/Manifest.toml",
                r#"
[package]
name = "lib"

[dependencies]
tokio = "1.30.0"

[target.'cfg(windows)'.dependencies]
winapi = "0.3.9"
"#,
            )
    }

    #[test]
    fn test_default_target_skips_target_specific() {
        let provider = fixture();
        let graph = graph_from(&provider, &["Manifest.toml"]);
        let resolver = DeclaredResolver::new();

        let deps = resolver
            .resolved_dependencies(&graph, DEFAULT_TARGET, &[])
            .unwrap();
        let names: Vec<_> = deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["serde", "tokio"]);

        // Property indirection resolved to its literal
        assert_eq!(deps[0].version, "1.0.0");
    }

    #[test]
    fn test_specific_target_adds_its_section() {
        let provider = fixture();
        let graph = graph_from(&provider, &["Manifest.toml"]);
        let resolver = DeclaredResolver::new();

        let deps = resolver
            .resolved_dependencies(&graph, "cfg(windows)", &[])
            .unwrap();
        assert!(deps.iter().any(|d| d.name == "winapi"));
    }

    #[test]
    fn test_requested_versions_override() {
        let provider = fixture();
        let graph = graph_from(&provider, &["Manifest.toml"]);
        let resolver = DeclaredResolver::new();

        let requested = vec![ResolvedDependency {
            name: "Tokio".into(),
            version: "1.31.0".into(),
        }];
        let deps = resolver
            .resolved_dependencies(&graph, DEFAULT_TARGET, &requested)
            .unwrap();
        let tokio = deps.iter().find(|d| d.name == "tokio").unwrap();
        assert_eq!(tokio.version, "1.31.0");
    }
}
