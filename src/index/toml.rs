//! TOML manifest adapter.
//!
//! Translates one manifest's structured content into scope-tagged
//! dependency declarations and named version properties. All section walks
//! are tolerant of missing or oddly-typed sections; only a structural parse
//! failure (handled when the [`ManifestFile`] is created) is fatal.

use std::sync::LazyLock;

use regex::Regex;
use toml::Value;

use crate::core::declaration::{DeclScope, DependencyDeclaration, Property, VersionSpec};
use crate::core::edit::NodeLocator;
use crate::core::manifest::ManifestFile;
use crate::util::paths;

/// Dependency-bearing section names, in the order they are indexed.
pub const DEPENDENCY_TYPES: [&str; 3] = ["dependencies", "dev-dependencies", "build-dependencies"];

/// Property-reference syntax: the whole value is `$(name)`.
static PROPERTY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$\(([A-Za-z0-9_.-]+)\)$").unwrap());

/// Classify a raw version string as literal or property reference.
pub fn parse_version_spec(raw: &str) -> VersionSpec {
    match PROPERTY_RE.captures(raw) {
        Some(caps) => VersionSpec::Indirect(caps[1].to_string()),
        None => VersionSpec::Literal(raw.to_string()),
    }
}

/// One dependency entry as written, before declaration filtering.
///
/// Entries without any version expression still matter to graph discovery
/// (they may carry path references) and to centralized pinning (a pin
/// entry may exist without a version key yet).
#[derive(Debug, Clone)]
pub struct RawEntry {
    /// Dependency name (for `[replace]`, the part before any `:`)
    pub name: String,

    /// Scope the entry was found in
    pub scope: DeclScope,

    /// Locator of the entry itself
    pub entry_site: NodeLocator,

    /// Raw version string and the locator of that value, when present
    pub version: Option<(String, NodeLocator)>,

    /// `path` key as written, when present
    pub path: Option<String>,

    /// Whether a `git` alternative source is also declared
    pub git: bool,
}

/// Extract every dependency entry from a manifest, across direct,
/// workspace-aggregate, target-specific, replacement, and patch sections.
pub fn raw_entries(file: &ManifestFile) -> Vec<RawEntry> {
    let doc = file.doc();
    let mut entries = Vec::new();

    for dep_type in DEPENDENCY_TYPES {
        collect_section(
            file,
            doc.get(dep_type),
            DeclScope::Direct,
            NodeLocator::new(file.path(), [dep_type]),
            &mut entries,
        );
    }

    // Workspace-aggregate entries; these are the centralized pin table when
    // the pinning policy flags are enabled on this file.
    let ws_scope = if central_pinning_enabled(file) {
        DeclScope::CentrallyPinned
    } else {
        DeclScope::WorkspaceAggregate
    };
    collect_section(
        file,
        doc.get("workspace").and_then(|w| w.get("dependencies")),
        ws_scope,
        NodeLocator::new(file.path(), ["workspace", "dependencies"]),
        &mut entries,
    );

    // Target-specific sections
    if let Some(Value::Table(targets)) = doc.get("target") {
        for (target_id, target_val) in targets {
            for dep_type in DEPENDENCY_TYPES {
                collect_section(
                    file,
                    target_val.get(dep_type),
                    DeclScope::TargetSpecific(target_id.clone()),
                    NodeLocator::new(file.path(), ["target", target_id, dep_type]),
                    &mut entries,
                );
            }
        }
    }

    // Replacements: keys may be `name:version`
    if let Some(Value::Table(replacements)) = doc.get("replace") {
        for (key, entry) in replacements {
            let name = key.split(':').next().unwrap_or(key).to_string();
            let site = NodeLocator::new(file.path(), ["replace", key]);
            push_entry(file, name, DeclScope::Replacement, site, entry, &mut entries);
        }
    }

    // Patches, grouped per registry
    if let Some(Value::Table(patches)) = doc.get("patch") {
        for (registry, patch_val) in patches {
            if let Value::Table(patched) = patch_val {
                for (name, entry) in patched {
                    let site = NodeLocator::new(file.path(), ["patch", registry, name]);
                    push_entry(file, name.clone(), DeclScope::Patch, site, entry, &mut entries);
                }
            }
        }
    }

    entries
}

fn collect_section(
    file: &ManifestFile,
    section: Option<&Value>,
    scope: DeclScope,
    base: NodeLocator,
    out: &mut Vec<RawEntry>,
) {
    let Some(Value::Table(table)) = section else {
        return;
    };
    for (name, entry) in table {
        push_entry(file, name.clone(), scope.clone(), base.child(name), entry, out);
    }
}

fn push_entry(
    file: &ManifestFile,
    name: String,
    scope: DeclScope,
    entry_site: NodeLocator,
    entry: &Value,
    out: &mut Vec<RawEntry>,
) {
    match entry {
        Value::String(version) => out.push(RawEntry {
            name,
            scope,
            version: Some((version.clone(), entry_site.clone())),
            entry_site,
            path: None,
            git: false,
        }),
        Value::Table(table) => {
            let version = table
                .get("version")
                .and_then(|v| v.as_str())
                .map(|v| (v.to_string(), entry_site.child("version")));
            let path = table.get("path").and_then(|p| p.as_str()).map(String::from);
            let git = table.get("git").is_some();
            out.push(RawEntry {
                name,
                scope,
                entry_site,
                version,
                path,
                git,
            });
        }
        // Anything else is not a dependency entry; leave it alone.
        _ => {}
    }
}

/// Index a manifest into typed dependency declarations.
///
/// Entries without any version expression are graph edges only, not
/// patchable declarations, and are skipped here.
pub fn index_manifest(file: &ManifestFile) -> Vec<DependencyDeclaration> {
    raw_entries(file)
        .into_iter()
        .filter_map(|entry| {
            let (raw, site) = entry.version?;
            Some(DependencyDeclaration {
                name: entry.name,
                spec: parse_version_spec(&raw),
                scope: entry.scope,
                file: file.path().to_string(),
                path_ref: entry
                    .path
                    .as_deref()
                    .map(|p| paths::join(file.directory(), p)),
                site,
            })
        })
        .collect()
}

/// The named version properties defined by a manifest's `[properties]`.
pub fn properties_of(file: &ManifestFile) -> Vec<Property> {
    let Some(Value::Table(table)) = file.doc().get("properties") else {
        return Vec::new();
    };

    table
        .iter()
        .filter_map(|(name, value)| {
            let raw = value.as_str()?;
            Some(Property {
                name: name.clone(),
                file: file.path().to_string(),
                value: parse_version_spec(raw),
                site: NodeLocator::new(file.path(), ["properties", name]),
            })
        })
        .collect()
}

/// Whether this file is a centralized pin table with transitive pinning
/// enabled (both policy flags must be set on its `[workspace]` section).
pub fn central_pinning_enabled(file: &ManifestFile) -> bool {
    let Some(workspace) = file.doc().get("workspace") else {
        return false;
    };
    let flag = |key: &str| workspace.get(key).and_then(|v| v.as_bool()) == Some(true);
    flag("central-versions") && flag("transitive-pinning")
}

/// Locator of the centralized pin table in a pinning-enabled file.
pub fn pin_table_locator(file: &ManifestFile) -> NodeLocator {
    NodeLocator::new(file.path(), ["workspace", "dependencies"])
}
