//! Lenient version parsing.
//!
//! Manifest literals are frequently two-part (`1.2`) or single-part (`3`)
//! strings that `semver` rejects. Peer-mode comparison only needs a total
//! order, so short forms are padded with zero components before parsing.

use semver::Version;

/// Parse a version literal, padding missing components with zeros.
///
/// Returns `None` for ranges, wildcards, and anything else that still
/// fails to parse after padding.
pub fn parse_lenient(literal: &str) -> Option<Version> {
    let literal = literal.trim();
    if literal.is_empty() || literal.contains([',', '*']) {
        return None;
    }

    if let Ok(v) = Version::parse(literal) {
        return Some(v);
    }

    // Split off pre-release/build metadata before counting components.
    let (core, rest) = match literal.find(['-', '+']) {
        Some(idx) => (&literal[..idx], &literal[idx..]),
        None => (literal, ""),
    };

    let dots = core.matches('.').count();
    if dots >= 2 {
        return None;
    }

    let padded = match dots {
        0 => format!("{core}.0.0{rest}"),
        _ => format!("{core}.0{rest}"),
    };
    Version::parse(&padded).ok()
}
