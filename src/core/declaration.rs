//! Dependency declarations and version specifiers.
//!
//! Declarations are read-only snapshots re-derived from manifest content on
//! every run. The graph and patch logic is written once against these types;
//! format adapters translate raw manifest syntax into them.

use std::fmt;

use crate::core::edit::NodeLocator;

/// How a version is expressed at a declaration site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// A literal version string, e.g. `"1.2.0"`.
    Literal(String),

    /// A reference to a named property, e.g. `"$(tokio-version)"`.
    Indirect(String),
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpec::Literal(v) => write!(f, "{v}"),
            VersionSpec::Indirect(name) => write!(f, "$({name})"),
        }
    }
}

/// The scope a declaration was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclScope {
    /// A plain dependency section of one manifest.
    Direct,

    /// A `[workspace.dependencies]` entry shared by members.
    WorkspaceAggregate,

    /// A dependency section under `[target.<id>]`.
    TargetSpecific(String),

    /// A `[replace]` entry.
    Replacement,

    /// A `[patch.<registry>]` entry.
    Patch,

    /// A centralized pin entry: `[workspace.dependencies]` in a file with
    /// the central-versions and transitive-pinning policy flags enabled.
    CentrallyPinned,
}

/// One textual declaration of a dependency in one manifest file.
#[derive(Debug, Clone)]
pub struct DependencyDeclaration {
    /// Dependency name as written
    pub name: String,

    /// Version specifier (literal or property reference)
    pub spec: VersionSpec,

    /// Where the declaration was found
    pub scope: DeclScope,

    /// Owning manifest file (repository-relative path)
    pub file: String,

    /// Local sub-manifest directory, if the declaration also names one
    pub path_ref: Option<String>,

    /// Structural location of the version value, for editing
    pub site: NodeLocator,
}

impl DependencyDeclaration {
    /// Case-insensitive name match, the way dependency names compare in
    /// every ecosystem this models.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// A named version property defined in a manifest.
#[derive(Debug, Clone)]
pub struct Property {
    /// Property name
    pub name: String,

    /// Owning manifest file
    pub file: String,

    /// The property's value, itself literal or another reference
    pub value: VersionSpec,

    /// Structural location of the definition, for editing
    pub site: NodeLocator,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_display() {
        assert_eq!(VersionSpec::Literal("1.0.0".into()).to_string(), "1.0.0");
        assert_eq!(VersionSpec::Indirect("v".into()).to_string(), "$(v)");
    }

    #[test]
    fn test_name_match_is_case_insensitive() {
        let decl = DependencyDeclaration {
            name: "Serde".into(),
            spec: VersionSpec::Literal("1.0.0".into()),
            scope: DeclScope::Direct,
            file: "Manifest.toml".into(),
            path_ref: None,
            site: NodeLocator::new("Manifest.toml", ["dependencies", "Serde"]),
        };
        assert!(decl.matches_name("serde"));
        assert!(!decl.matches_name("serde_json"));
    }
}
