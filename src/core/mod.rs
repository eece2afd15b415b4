//! Core data structures for Drydock.
//!
//! This module contains the foundational types used throughout Drydock:
//! - Manifest file snapshots and roles
//! - Dependency declarations and version specifiers
//! - Edits and edit application

pub mod declaration;
pub mod edit;
pub mod manifest;

pub use declaration::{DeclScope, DependencyDeclaration, Property, VersionSpec};
pub use edit::{apply_edits, ChangedFile, Edit, EditKind, NodeLocator};
pub use manifest::{FileRole, ManifestFile, MANIFEST_NAME};
