//! High-level operations composing the library: discover, patch, check,
//! write.

pub mod update;

pub use update::{update, UpdateOptions, UpdateReport};
