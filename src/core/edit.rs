//! Edits over manifest snapshots.
//!
//! Each manifest's content is treated as an immutable snapshot plus a list
//! of [`Edit`] records. Applying the edits for a file happens in one pass
//! over a freshly parsed structure-preserving document, producing a new
//! snapshot; nothing mutates text incrementally. This keeps the patch step
//! pure and deterministic regardless of discovery order.

use anyhow::{bail, Context, Result};
use toml_edit::{DocumentMut, Item};

/// Structural identifier of a value inside a manifest: the owning file and
/// the chain of table keys leading to the node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeLocator {
    /// Repository-relative path of the owning file
    pub file: String,

    /// Key path from the document root to the node
    pub keys: Vec<String>,
}

impl NodeLocator {
    /// Build a locator from a file path and key components.
    pub fn new<I, S>(file: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NodeLocator {
            file: file.into(),
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Extend the key path by one component.
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut keys = self.keys.clone();
        keys.push(key.into());
        NodeLocator {
            file: self.file.clone(),
            keys,
        }
    }
}

/// What an edit does at its target node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditKind {
    /// Replace a string value. `old` is the value expected at the site;
    /// application fails if the snapshot no longer matches.
    Set { old: String, new: String },

    /// Insert a `version` key into an existing entry table that lacks one.
    AddVersionKey { new: String },

    /// Append a brand-new pin entry (`name = "version"`) to the table at
    /// the locator, after the last existing entry.
    AddPin { name: String, version: String },
}

/// A single edit against one manifest file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Target node
    pub site: NodeLocator,

    /// The change to perform there
    pub kind: EditKind,
}

/// A file whose content actually changed, with both snapshots.
#[derive(Debug, Clone)]
pub struct ChangedFile {
    /// Repository-relative path
    pub path: String,

    /// Content before the edits
    pub old_content: String,

    /// Content after the edits
    pub new_content: String,
}

/// Apply a set of edits (all belonging to one file) to a content snapshot,
/// returning the new snapshot.
///
/// Edits are applied sorted by key path. Two edits targeting the same node
/// are rejected as overlapping.
pub fn apply_edits(content: &str, edits: &[Edit]) -> Result<String> {
    let mut doc: DocumentMut = content
        .parse()
        .context("failed to re-parse manifest for editing")?;

    let mut sorted: Vec<&Edit> = edits.iter().collect();
    sorted.sort_by(|a, b| a.site.cmp(&b.site));
    for pair in sorted.windows(2) {
        if pair[0].site == pair[1].site {
            bail!(
                "overlapping edits at `{}` in `{}`",
                pair[0].site.keys.join("."),
                pair[0].site.file
            );
        }
    }

    for edit in sorted {
        apply_one(&mut doc, edit)?;
    }

    Ok(doc.to_string())
}

fn apply_one(doc: &mut DocumentMut, edit: &Edit) -> Result<()> {
    let site = &edit.site;
    let item = navigate_mut(doc.as_item_mut(), &site.keys).with_context(|| {
        format!(
            "edit target `{}` not found in `{}`",
            site.keys.join("."),
            site.file
        )
    })?;

    match &edit.kind {
        EditKind::Set { old, new } => {
            let value = item.as_value_mut().with_context(|| {
                format!(
                    "edit target `{}` in `{}` is not a value",
                    site.keys.join("."),
                    site.file
                )
            })?;
            let current = value.as_str().with_context(|| {
                format!(
                    "edit target `{}` in `{}` is not a string",
                    site.keys.join("."),
                    site.file
                )
            })?;
            if current != old {
                bail!(
                    "edit target `{}` in `{}` changed underneath us: expected `{}`, found `{}`",
                    site.keys.join("."),
                    site.file,
                    old,
                    current
                );
            }
            let decor = value.decor().clone();
            let mut replacement = toml_edit::Value::from(new.clone());
            *replacement.decor_mut() = decor;
            *value = replacement;
        }
        EditKind::AddVersionKey { new } => {
            let table = item.as_table_like_mut().with_context(|| {
                format!(
                    "edit target `{}` in `{}` is not a table",
                    site.keys.join("."),
                    site.file
                )
            })?;
            if table.contains_key("version") {
                bail!(
                    "entry `{}` in `{}` already has a version key",
                    site.keys.join("."),
                    site.file
                );
            }
            table.insert("version", toml_edit::value(new.clone()));
        }
        EditKind::AddPin { name, version } => {
            let table = item.as_table_like_mut().with_context(|| {
                format!(
                    "pin table `{}` not found in `{}`",
                    site.keys.join("."),
                    site.file
                )
            })?;
            if table.contains_key(name) {
                bail!("pin entry `{}` already exists in `{}`", name, site.file);
            }
            table.insert(name, toml_edit::value(version.clone()));
        }
    }

    Ok(())
}

fn navigate_mut<'a>(mut item: &'a mut Item, keys: &[String]) -> Option<&'a mut Item> {
    for key in keys {
        item = item.as_table_like_mut()?.get_mut(key)?;
    }
    Some(item)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"[package]
name = "demo"
version = "0.1.0"

[dependencies]
serde = "1.0.0"
tokio = { version = "1.30.0", path = "../tokio" } # keep comment
zlib = { path = "../zlib" }
"#;

    #[test]
    fn test_set_bare_string() {
        let edit = Edit {
            site: NodeLocator::new("Manifest.toml", ["dependencies", "serde"]),
            kind: EditKind::Set {
                old: "1.0.0".into(),
                new: "1.0.1".into(),
            },
        };
        let updated = apply_edits(MANIFEST, &[edit]).unwrap();
        assert!(updated.contains("serde = \"1.0.1\""));
        // Unrelated content untouched
        assert!(updated.contains("version = \"0.1.0\""));
    }

    #[test]
    fn test_set_inline_table_preserves_decor() {
        let edit = Edit {
            site: NodeLocator::new("Manifest.toml", ["dependencies", "tokio", "version"]),
            kind: EditKind::Set {
                old: "1.30.0".into(),
                new: "1.31.0".into(),
            },
        };
        let updated = apply_edits(MANIFEST, &[edit]).unwrap();
        assert!(updated.contains("tokio = { version = \"1.31.0\", path = \"../tokio\" } # keep comment"));
    }

    #[test]
    fn test_set_rejects_stale_old_value() {
        let edit = Edit {
            site: NodeLocator::new("Manifest.toml", ["dependencies", "serde"]),
            kind: EditKind::Set {
                old: "0.9.0".into(),
                new: "1.0.1".into(),
            },
        };
        assert!(apply_edits(MANIFEST, &[edit]).is_err());
    }

    #[test]
    fn test_add_version_key() {
        let edit = Edit {
            site: NodeLocator::new("Manifest.toml", ["dependencies", "zlib"]),
            kind: EditKind::AddVersionKey { new: "1.3.1".into() },
        };
        let updated = apply_edits(MANIFEST, &[edit]).unwrap();
        assert!(updated.contains("path = \"../zlib\""));
        assert!(updated.contains("version = \"1.3.1\""));
    }

    #[test]
    fn test_add_pin_appends_after_last_entry() {
        let content = "[workspace.dependencies]\nserde = \"1.0.0\"\ntokio = \"1.30.0\"\n";
        let edit = Edit {
            site: NodeLocator::new("Manifest.toml", ["workspace", "dependencies"]),
            kind: EditKind::AddPin {
                name: "zlib".into(),
                version: "1.3.1".into(),
            },
        };
        let updated = apply_edits(content, &[edit]).unwrap();
        let serde_pos = updated.find("serde").unwrap();
        let tokio_pos = updated.find("tokio").unwrap();
        let zlib_pos = updated.find("zlib").unwrap();
        assert!(serde_pos < tokio_pos && tokio_pos < zlib_pos);
    }

    #[test]
    fn test_overlapping_edits_rejected() {
        let site = NodeLocator::new("Manifest.toml", ["dependencies", "serde"]);
        let edits = vec![
            Edit {
                site: site.clone(),
                kind: EditKind::Set {
                    old: "1.0.0".into(),
                    new: "1.0.1".into(),
                },
            },
            Edit {
                site,
                kind: EditKind::Set {
                    old: "1.0.0".into(),
                    new: "1.0.2".into(),
                },
            },
        ];
        assert!(apply_edits(MANIFEST, &edits).is_err());
    }
}
