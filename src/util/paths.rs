//! Repository-relative path handling.
//!
//! All manifest paths are repository-relative strings with forward slashes.
//! Normalization is purely lexical: the remote host the file provider talks
//! to may not exist on the local filesystem, so `canonicalize` is never an
//! option here.

/// Lexically normalize a repository-relative path.
///
/// Removes `.` components, resolves `..` against earlier components, and
/// collapses duplicate separators. `..` that would escape the repository
/// root is dropped. The repository root itself is the empty string.
pub fn clean(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for comp in path.split('/') {
        match comp {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// Join a path onto a base directory and normalize the result.
///
/// An empty base means the repository root.
pub fn join(base: &str, rel: &str) -> String {
    if base.is_empty() {
        clean(rel)
    } else {
        clean(&format!("{base}/{rel}"))
    }
}

/// The directory containing a repository-relative path.
///
/// Returns the empty string for top-level paths.
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Whether a path component contains glob metacharacters.
pub fn has_glob(component: &str) -> bool {
    component.contains(['*', '?', '['])
}
