//! Patch-phase errors.
//!
//! These are scoped to the dependency being patched; discovery-phase
//! failures live in [`crate::graph::DiscoverError`] and abort the whole
//! run instead.

use thiserror::Error;

/// Failure while computing or applying a version patch.
#[derive(Debug, Error)]
pub enum PatchError {
    /// Two build targets disagree on the version a peer dependency must
    /// end up at. Applying either answer would break the other target, so
    /// nothing is applied.
    #[error("build targets disagree on `{name}`: {}", render_versions(versions))]
    VersionConflict {
        /// The peer dependency name
        name: String,

        /// `(target, version)` pairs, one per disagreeing target
        versions: Vec<(String, String)>,
    },

    /// The native resolver failed to produce a candidate set.
    #[error("native resolver failed")]
    Resolver(#[source] anyhow::Error),

    /// Computed edits could not be applied to a manifest snapshot.
    #[error("failed to apply edits to `{path}`")]
    Apply {
        /// Repository-relative path of the manifest
        path: String,
        #[source]
        source: anyhow::Error,
    },
}

fn render_versions(versions: &[(String, String)]) -> String {
    versions
        .iter()
        .map(|(target, version)| format!("{target} wants {version}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_names_targets() {
        let err = PatchError::VersionConflict {
            name: "serde".into(),
            versions: vec![
                ("default".into(), "2.0.0".into()),
                ("cfg(windows)".into(), "2.0.1".into()),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("serde"));
        assert!(msg.contains("default wants 2.0.0"));
        assert!(msg.contains("cfg(windows) wants 2.0.1"));
    }
}
