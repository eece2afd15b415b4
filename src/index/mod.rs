//! Declaration indexing.
//!
//! The graph and patch logic is written once against
//! [`DependencyDeclaration`](crate::core::DependencyDeclaration); format
//! adapters translate raw manifest syntax into that shape. One TOML
//! adapter ships with the crate.

pub mod toml;

pub use self::toml::{
    central_pinning_enabled, index_manifest, parse_version_spec, pin_table_locator,
    properties_of, raw_entries, RawEntry, DEPENDENCY_TYPES,
};
