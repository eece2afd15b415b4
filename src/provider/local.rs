//! Local filesystem provider rooted at a repository checkout.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::provider::{DirEntry, FileProvider};

/// A [`FileProvider`] backed by a directory on the local filesystem.
pub struct LocalProvider {
    root: PathBuf,
}

impl LocalProvider {
    /// Create a provider rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalProvider { root: root.into() }
    }

    /// The repository root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, rel: &str) -> PathBuf {
        if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        }
    }
}

impl FileProvider for LocalProvider {
    fn read(&self, path: &str) -> Result<Option<String>> {
        let full = self.resolve(path);
        if !full.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(&full)
            .with_context(|| format!("failed to read file: {}", full.display()))?;
        Ok(Some(content))
    }

    fn list(&self, dir: &str) -> Result<Vec<DirEntry>> {
        let full = self.resolve(dir);
        if !full.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&full)
            .with_context(|| format!("failed to read directory: {}", full.display()))?
        {
            let entry = entry?;
            let file_type = entry.file_type()?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: file_type.is_dir(),
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn write(&self, path: &str, content: &str) -> Result<()> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
        fs::write(&full, content)
            .with_context(|| format!("failed to write file: {}", full.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_is_none() {
        let tmp = TempDir::new().unwrap();
        let provider = LocalProvider::new(tmp.path());
        assert_eq!(provider.read("Manifest.toml").unwrap(), None);
    }

    #[test]
    fn test_write_then_read() {
        let tmp = TempDir::new().unwrap();
        let provider = LocalProvider::new(tmp.path());

        provider.write("crates/core/Manifest.toml", "[package]\n").unwrap();
        assert_eq!(
            provider.read("crates/core/Manifest.toml").unwrap().as_deref(),
            Some("[package]\n")
        );
    }

    #[test]
    fn test_list_sorted_with_kinds() {
        let tmp = TempDir::new().unwrap();
        let provider = LocalProvider::new(tmp.path());

        fs::create_dir_all(tmp.path().join("crates/b")).unwrap();
        fs::create_dir_all(tmp.path().join("crates/a")).unwrap();
        fs::write(tmp.path().join("crates/readme.md"), "x").unwrap();

        let entries = provider.list("crates").unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "readme.md"]);
        assert!(entries[0].is_dir);
        assert!(!entries[2].is_dir);
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let provider = LocalProvider::new(tmp.path());
        assert!(provider.list("nope").unwrap().is_empty());
    }
}
