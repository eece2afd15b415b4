//! Discovery error types.

use thiserror::Error;

/// Error during manifest graph discovery.
///
/// Discovery-phase errors abort the entire operation: the graph itself is
/// invalid, so nothing downstream can be trusted.
#[derive(Debug, Error)]
pub enum DiscoverError {
    /// A root manifest could not be fetched at all.
    #[error("root manifest not found: `{path}`")]
    RootNotFound { path: String },

    /// Required path edges whose targets could not be fetched, collected
    /// across the whole traversal and reported once.
    #[error("path dependencies unreachable: {}", paths.join(", "))]
    PathsUnreachable { paths: Vec<String> },

    /// A fetched manifest failed to parse.
    #[error("manifest not parseable: `{path}`")]
    NotParseable {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// The file provider failed in a way other than "not found".
    #[error("failed to fetch `{path}`: {message}")]
    Provider { path: String, message: String },
}
