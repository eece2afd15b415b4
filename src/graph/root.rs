//! Workspace-root ancestry.
//!
//! Given a workspace member, find its owning workspace root: an explicit
//! `package.workspace` back-reference wins; otherwise parent directories
//! are walked upward until a manifest with a `[workspace]` section is
//! found or the repository root is passed.
//!
//! This walk never raises. Absence of a root is a valid outcome ("not
//! part of a workspace"), and lookup failures along the way, including a
//! candidate root that does not parse, are treated the same way to keep
//! the historical lax behavior.

use crate::core::manifest::{ManifestFile, MANIFEST_NAME};
use crate::graph::ManifestGraph;
use crate::provider::FileProvider;
use crate::util::paths;

/// Find the owning workspace root for a member during discovery, fetching
/// candidates through the provider. Returns the root's path and content.
pub(crate) fn find_workspace_root_via_provider<P: FileProvider>(
    provider: &P,
    member: &ManifestFile,
) -> Option<(String, String)> {
    if let Some(back_ref) = member.workspace_back_reference() {
        let candidate = paths::join(member.directory(), &format!("{back_ref}/{MANIFEST_NAME}"));
        return match read_workspace_root(provider, &candidate) {
            Some(content) => Some((candidate, content)),
            // An explicit back-reference that doesn't lead to a workspace
            // root is not followed up with a directory walk.
            None => None,
        };
    }

    let mut dir = member.directory().to_string();
    loop {
        if dir.is_empty() {
            return None;
        }
        dir = paths::parent_dir(&dir).to_string();
        let candidate = paths::join(&dir, MANIFEST_NAME);
        if let Some(content) = read_workspace_root(provider, &candidate) {
            return Some((candidate, content));
        }
        if dir.is_empty() {
            return None;
        }
    }
}

/// Read a candidate path and keep it only if it parses and declares a
/// `[workspace]` section. Read and parse failures both count as "not a
/// workspace root here".
fn read_workspace_root<P: FileProvider>(provider: &P, path: &str) -> Option<String> {
    let content = provider.read(path).ok().flatten()?;
    let doc: toml::Value = match content.parse() {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(path, error = %e, "skipping malformed candidate workspace root");
            return None;
        }
    };
    doc.get("workspace").is_some().then_some(content)
}

/// Find the owning workspace root of a member within an already-discovered
/// graph. Same back-reference-then-walk policy, but never fetches.
pub fn owning_workspace_root<'a>(
    graph: &'a ManifestGraph,
    member: &ManifestFile,
) -> Option<&'a ManifestFile> {
    if let Some(back_ref) = member.workspace_back_reference() {
        let candidate = paths::join(member.directory(), &format!("{back_ref}/{MANIFEST_NAME}"));
        return graph.get(&candidate).filter(|f| f.is_workspace_root());
    }

    let mut dir = member.directory().to_string();
    loop {
        if dir.is_empty() {
            return None;
        }
        dir = paths::parent_dir(&dir).to_string();
        let candidate = paths::join(&dir, MANIFEST_NAME);
        if let Some(file) = graph.get(&candidate) {
            if file.is_workspace_root() {
                return Some(file);
            }
        }
        if dir.is_empty() {
            return None;
        }
    }
}
