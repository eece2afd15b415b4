//! Centralized pin handling.
//!
//! When a graph carries a pin table with the transitive-pinning policy
//! enabled, transitive updates land there: update the entry's version if it
//! has one, add the version key if the entry exists without one, or append
//! a brand-new pin after the last existing entry.

use crate::core::declaration::DeclScope;
use crate::core::edit::{Edit, EditKind};
use crate::core::manifest::ManifestFile;
use crate::graph::ManifestGraph;
use crate::index;
use crate::patch::classify::{self, Classification};
use crate::resolve::{resolve_spec, Resolution};

/// How a transitive update lands in the pin table.
#[derive(Debug)]
pub(crate) enum PinPlan {
    /// No pinning-enabled file anywhere in the graph.
    NoPinFile,

    /// The pin already carries the requested version.
    AlreadyCorrect,

    /// The pin exists but cannot be updated (range syntax, or a property
    /// reference that does not resolve).
    Unsupported,

    /// Edits to stage.
    Edits(Vec<Edit>),
}

/// The graph's pinning-enabled file, if any. Deterministic: first in path
/// order.
pub(crate) fn pin_file(graph: &ManifestGraph) -> Option<&ManifestFile> {
    graph.files().find(|f| index::central_pinning_enabled(f))
}

/// Plan the pin-table changes for moving `name` to `new_version`.
pub(crate) fn plan_pin(graph: &ManifestGraph, name: &str, new_version: &str) -> PinPlan {
    let Some(file) = pin_file(graph) else {
        return PinPlan::NoPinFile;
    };

    let entry = index::raw_entries(file)
        .into_iter()
        .find(|e| e.scope == DeclScope::CentrallyPinned && e.name.eq_ignore_ascii_case(name));

    let Some(entry) = entry else {
        tracing::info!(name, file = file.path(), "appending new centralized pin");
        return PinPlan::Edits(vec![Edit {
            site: index::pin_table_locator(file),
            kind: EditKind::AddPin {
                name: name.to_string(),
                version: new_version.to_string(),
            },
        }]);
    };

    let Some((raw, site)) = entry.version else {
        // Pin entry exists as a table without a version key.
        return PinPlan::Edits(vec![Edit {
            site: entry.entry_site,
            kind: EditKind::AddVersionKey {
                new: new_version.to_string(),
            },
        }]);
    };

    // The pin's value may itself be a property reference; the edit then
    // targets the property definition site.
    let spec = index::parse_version_spec(&raw);
    let (value, site) = match resolve_spec(graph, file, &spec, &site) {
        Resolution::Literal { value, site } => (value, site),
        Resolution::Unresolved { property } => {
            tracing::warn!(name, property, "pin references an undefined property");
            return PinPlan::Unsupported;
        }
        Resolution::Cycle { chain } => {
            tracing::warn!(name, chain = chain.join(" -> "), "pin property cycle");
            return PinPlan::Unsupported;
        }
    };

    match classify::classify(&value, None, new_version) {
        Classification::AlreadyCorrect => PinPlan::AlreadyCorrect,
        Classification::Unsupported => PinPlan::Unsupported,
        _ => PinPlan::Edits(vec![Edit {
            site,
            kind: EditKind::Set {
                old: value.clone(),
                new: classify::replace_within_brackets(&value, new_version),
            },
        }]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{graph_from, MemoryProvider};

    const PIN_HEADER: &str =
        "[workspace]\nmembers = []\ncentral-versions = true\ntransitive-pinning = true\n";

    #[test]
    fn test_update_existing_pin() {
        let provider = MemoryProvider::new().with_file(
            "Manifest.toml",
            format!("{PIN_HEADER}\n[workspace.dependencies]\nserde = \"1.0.0\"\n"),
        );
        let graph = graph_from(&provider, &["Manifest.toml"]);

        match plan_pin(&graph, "serde", "1.0.5") {
            PinPlan::Edits(edits) => {
                assert_eq!(edits.len(), 1);
                assert_eq!(
                    edits[0].kind,
                    EditKind::Set {
                        old: "1.0.0".into(),
                        new: "1.0.5".into()
                    }
                );
            }
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn test_add_version_key_to_versionless_entry() {
        let provider = MemoryProvider::new().with_file(
            "Manifest.toml",
            format!("{PIN_HEADER}\n[workspace.dependencies]\nserde = {{ path = \"../serde\", git = \"https://example.com/serde\" }}\n"),
        );
        let graph = graph_from(&provider, &["Manifest.toml"]);

        match plan_pin(&graph, "serde", "1.0.5") {
            PinPlan::Edits(edits) => {
                assert_eq!(edits[0].kind, EditKind::AddVersionKey { new: "1.0.5".into() });
                assert_eq!(
                    edits[0].site.keys,
                    vec!["workspace", "dependencies", "serde"]
                );
            }
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn test_append_new_pin() {
        let provider = MemoryProvider::new().with_file(
            "Manifest.toml",
            format!("{PIN_HEADER}\n[workspace.dependencies]\ntokio = \"1.30.0\"\n"),
        );
        let graph = graph_from(&provider, &["Manifest.toml"]);

        match plan_pin(&graph, "serde", "1.0.5") {
            PinPlan::Edits(edits) => {
                assert_eq!(
                    edits[0].kind,
                    EditKind::AddPin {
                        name: "serde".into(),
                        version: "1.0.5".into()
                    }
                );
                assert_eq!(edits[0].site.keys, vec!["workspace", "dependencies"]);
            }
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn test_plain_workspace_table_is_not_a_pin_file() {
        let provider = MemoryProvider::new().with_file(
            "Manifest.toml",
            "[workspace]\nmembers = []\n\n[workspace.dependencies]\nserde = \"1.0.0\"\n",
        );
        let graph = graph_from(&provider, &["Manifest.toml"]);
        assert!(matches!(plan_pin(&graph, "serde", "1.0.5"), PinPlan::NoPinFile));
    }

    #[test]
    fn test_indirect_pin_edits_the_property_site() {
        let provider = MemoryProvider::new().with_file(
            "Manifest.toml",
            format!(
                "{PIN_HEADER}\n[properties]\nserde-version = \"1.0.0\"\n\n[workspace.dependencies]\nserde = \"$(serde-version)\"\n"
            ),
        );
        let graph = graph_from(&provider, &["Manifest.toml"]);

        match plan_pin(&graph, "serde", "1.0.5") {
            PinPlan::Edits(edits) => {
                assert_eq!(edits[0].site.keys, vec!["properties", "serde-version"]);
            }
            other => panic!("unexpected plan: {other:?}"),
        }
    }
}
