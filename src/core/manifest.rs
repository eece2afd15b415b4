//! Manifest file snapshots.
//!
//! A [`ManifestFile`] pairs a repository-relative path with an immutable
//! content snapshot and its parsed form. Content is replaced only by the
//! version patcher; re-parsing happens at that point so the parsed view
//! never drifts from the text.

use crate::util::paths;

/// Canonical manifest filename.
pub const MANIFEST_NAME: &str = "Manifest.toml";

/// How a file participates in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    /// A root manifest, independently updatable.
    Primary,

    /// Transitively required, fetched so the graph resolves, but not
    /// itself a target of version updates.
    Support,
}

/// A manifest file discovered as part of one dependency graph.
#[derive(Debug, Clone)]
pub struct ManifestFile {
    /// Repository-relative path, normalized
    path: String,

    /// Raw text content
    content: String,

    /// Parsed structured content
    doc: toml::Value,

    /// Primary or support classification
    role: FileRole,
}

impl ManifestFile {
    /// Create a manifest file from raw content, parsing it eagerly.
    ///
    /// A parse failure here is fatal to the whole operation: a graph is
    /// only as good as its weakest file.
    pub fn new(path: impl Into<String>, content: impl Into<String>, role: FileRole) -> Result<Self, toml::de::Error> {
        let path = paths::clean(&path.into());
        let content = content.into();
        let doc = content.parse::<toml::Value>()?;
        Ok(ManifestFile {
            path,
            content,
            doc,
            role,
        })
    }

    /// Repository-relative path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The directory containing this manifest (empty string = repo root).
    pub fn directory(&self) -> &str {
        paths::parent_dir(&self.path)
    }

    /// Raw text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Parsed structured content.
    pub fn doc(&self) -> &toml::Value {
        &self.doc
    }

    /// Primary or support.
    pub fn role(&self) -> FileRole {
        self.role
    }

    /// Whether this file declares a workspace section.
    pub fn is_workspace_root(&self) -> bool {
        self.doc.get("workspace").is_some()
    }

    /// Whether this manifest inherits anything from a workspace, either via
    /// an explicit `package.workspace` back-reference or a nested
    /// `workspace = true` marker anywhere in the document.
    pub fn is_workspace_member(&self) -> bool {
        if self
            .doc
            .get("package")
            .and_then(|p| p.get("workspace"))
            .is_some()
        {
            return true;
        }
        value_has_workspace_marker(&self.doc)
    }

    /// The explicit `package.workspace` back-reference, if declared.
    pub fn workspace_back_reference(&self) -> Option<&str> {
        self.doc
            .get("package")
            .and_then(|p| p.get("workspace"))
            .and_then(|w| w.as_str())
    }

    /// Replace the content snapshot, re-parsing the new text.
    pub fn set_content(&mut self, content: String) -> Result<(), toml::de::Error> {
        let doc = content.parse::<toml::Value>()?;
        self.content = content;
        self.doc = doc;
        Ok(())
    }
}

fn value_has_workspace_marker(value: &toml::Value) -> bool {
    match value {
        toml::Value::Table(table) => table.iter().any(|(key, val)| {
            (key == "workspace" && val.as_bool() == Some(true)) || value_has_workspace_marker(val)
        }),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_paths() {
        let file = ManifestFile::new(
            "./crates/core/Manifest.toml",
            "[package]\nname = \"core\"\n",
            FileRole::Support,
        )
        .unwrap();

        assert_eq!(file.path(), "crates/core/Manifest.toml");
        assert_eq!(file.directory(), "crates/core");
        assert_eq!(file.role(), FileRole::Support);
    }

    #[test]
    fn test_parse_failure() {
        assert!(ManifestFile::new("Manifest.toml", "not [ toml", FileRole::Primary).is_err());
    }

    #[test]
    fn test_workspace_detection() {
        let root = ManifestFile::new(
            "Manifest.toml",
            "[workspace]\nmembers = [\"lib-a\"]\n",
            FileRole::Primary,
        )
        .unwrap();
        assert!(root.is_workspace_root());
        assert!(!root.is_workspace_member());

        let member = ManifestFile::new(
            "lib-a/Manifest.toml",
            "[package]\nname = \"lib-a\"\nversion = { workspace = true }\n",
            FileRole::Support,
        )
        .unwrap();
        assert!(member.is_workspace_member());
        assert!(!member.is_workspace_root());
    }

    #[test]
    fn test_back_reference() {
        let member = ManifestFile::new(
            "nested/lib/Manifest.toml",
            "[package]\nname = \"lib\"\nworkspace = \"../..\"\n",
            FileRole::Support,
        )
        .unwrap();
        assert_eq!(member.workspace_back_reference(), Some("../.."));
        assert!(member.is_workspace_member());
    }
}
