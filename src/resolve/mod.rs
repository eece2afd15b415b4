//! Property resolution.
//!
//! A version specifier may reference a named property instead of carrying
//! a literal. Resolution chases the chain through the declaring file's
//! `[properties]` and, failing that, the owning workspace root's, with an
//! explicit visited set so a revisited name is reported as a cycle rather
//! than looping forever.

use crate::core::declaration::{DependencyDeclaration, VersionSpec};
use crate::core::edit::NodeLocator;
use crate::core::manifest::ManifestFile;
use crate::graph::{owning_workspace_root, ManifestGraph};
use crate::index;

/// Outcome of resolving one version specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A concrete version, plus the definition site that would have to be
    /// edited to change it. For a literal specifier this is the
    /// declaration site itself; for an indirect one it is the final
    /// property definition in the chain.
    Literal { value: String, site: NodeLocator },

    /// The referenced property is not defined anywhere reachable.
    Unresolved { property: String },

    /// The indirection chain revisited a name.
    Cycle { chain: Vec<String> },
}

/// Resolve a declaration's version specifier.
pub fn resolve_declaration(graph: &ManifestGraph, decl: &DependencyDeclaration) -> Resolution {
    let Some(file) = graph.get(&decl.file) else {
        return Resolution::Unresolved {
            property: decl.spec.to_string(),
        };
    };
    resolve_spec(graph, file, &decl.spec, &decl.site)
}

/// Resolve a specifier found at `site` in `file`.
pub fn resolve_spec(
    graph: &ManifestGraph,
    file: &ManifestFile,
    spec: &VersionSpec,
    site: &NodeLocator,
) -> Resolution {
    let name = match spec {
        VersionSpec::Literal(value) => {
            return Resolution::Literal {
                value: value.clone(),
                site: site.clone(),
            }
        }
        VersionSpec::Indirect(name) => name.clone(),
    };

    // Search space for the whole chain: the declaring file's properties,
    // then its owning workspace root's.
    let mut properties = index::properties_of(file);
    if let Some(root) = owning_workspace_root(graph, file) {
        if root.path() != file.path() {
            properties.extend(index::properties_of(root));
        }
    }

    let mut visited: Vec<String> = Vec::new();
    let mut current = name;

    loop {
        if visited.contains(&current) {
            let mut chain = visited;
            chain.push(current);
            return Resolution::Cycle { chain };
        }
        visited.push(current.clone());

        let Some(property) = properties.iter().find(|p| p.name == current) else {
            return Resolution::Unresolved { property: current };
        };

        match &property.value {
            VersionSpec::Literal(value) => {
                return Resolution::Literal {
                    value: value.clone(),
                    site: property.site.clone(),
                }
            }
            VersionSpec::Indirect(next) => current = next.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{graph_from, MemoryProvider};

    fn decl_site(file: &str) -> NodeLocator {
        NodeLocator::new(file, ["dependencies", "d"])
    }

    #[test]
    fn test_literal_resolves_to_itself() {
        let provider = MemoryProvider::new().with_file(
            "Manifest.toml",
            "[package]\nname = \"app\"\n\n[dependencies]\nd = \"1.2.0\"\n",
        );
        let graph = graph_from(&provider, &["Manifest.toml"]);
        let file = graph.get("Manifest.toml").unwrap();

        let res = resolve_spec(
            &graph,
            file,
            &VersionSpec::Literal("1.2.0".into()),
            &decl_site("Manifest.toml"),
        );
        assert_eq!(
            res,
            Resolution::Literal {
                value: "1.2.0".into(),
                site: decl_site("Manifest.toml"),
            }
        );
    }

    #[test]
    fn test_single_hop_and_chain() {
        let provider = MemoryProvider::new().with_file(
            "Manifest.toml",
            r#"
[package]
name = "app"

[properties]
p = "$(q)"
q = "1.2.0"

[dependencies]
d = "$(p)"
"#,
        );
        let graph = graph_from(&provider, &["Manifest.toml"]);
        let file = graph.get("Manifest.toml").unwrap();

        let res = resolve_spec(
            &graph,
            file,
            &VersionSpec::Indirect("p".into()),
            &decl_site("Manifest.toml"),
        );
        match res {
            Resolution::Literal { value, site } => {
                assert_eq!(value, "1.2.0");
                // Edit target is the final property definition site.
                assert_eq!(site.keys, vec!["properties", "q"]);
            }
            other => panic!("unexpected resolution: {other:?}"),
        }
    }

    #[test]
    fn test_cycle_is_detected_and_named() {
        let provider = MemoryProvider::new().with_file(
            "Manifest.toml",
            "[package]\nname = \"app\"\n\n[properties]\np = \"$(q)\"\nq = \"$(p)\"\n",
        );
        let graph = graph_from(&provider, &["Manifest.toml"]);
        let file = graph.get("Manifest.toml").unwrap();

        let res = resolve_spec(
            &graph,
            file,
            &VersionSpec::Indirect("p".into()),
            &decl_site("Manifest.toml"),
        );
        assert_eq!(
            res,
            Resolution::Cycle {
                chain: vec!["p".into(), "q".into(), "p".into()]
            }
        );
    }

    #[test]
    fn test_unresolved_when_absent() {
        let provider = MemoryProvider::new()
            .with_file("Manifest.toml", "[package]\nname = \"app\"\n");
        let graph = graph_from(&provider, &["Manifest.toml"]);
        let file = graph.get("Manifest.toml").unwrap();

        let res = resolve_spec(
            &graph,
            file,
            &VersionSpec::Indirect("nope".into()),
            &decl_site("Manifest.toml"),
        );
        assert_eq!(res, Resolution::Unresolved { property: "nope".into() });
    }

    #[test]
    fn test_member_falls_back_to_workspace_root_properties() {
        let provider = MemoryProvider::new()
            .with_file(
                "Manifest.toml",
                "[workspace]\nmembers = [\"lib\"]\n\n[properties]\nshared = \"2.0.0\"\n",
            )
            .with_file(
                "lib/Manifest.toml",
                "[package]\nname = \"lib\"\n\n[dependencies]\nd = \"$(shared)\"\n",
            );
        let graph = graph_from(&provider, &["Manifest.toml"]);
        let member = graph.get("lib/Manifest.toml").unwrap();

        let res = resolve_spec(
            &graph,
            member,
            &VersionSpec::Indirect("shared".into()),
            &decl_site("lib/Manifest.toml"),
        );
        match res {
            Resolution::Literal { value, site } => {
                assert_eq!(value, "2.0.0");
                assert_eq!(site.file, "Manifest.toml");
            }
            other => panic!("unexpected resolution: {other:?}"),
        }
    }
}
