//! Slash-path utilities for tree node identity and listing requests.
//!
//! Tree paths are server-side, slash-delimited strings, not local
//! `PathBuf`s. Directory paths always carry a trailing `/` and file paths
//! never do, so the trailing slash alone tells the two kinds apart.

/// Iterate over the non-empty segments of a slash path.
fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn join_segments(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 2);
    for segment in segments(path) {
        out.push('/');
        out.push_str(segment);
    }
    out
}

/// Normalize a directory path: single leading slash, no repeated
/// separators, trailing slash.
///
/// # Examples
/// - `data` -> `/data/`
/// - `/data//raw` -> `/data/raw/`
/// - `/` or `` -> `/`
pub fn dir_key(path: &str) -> String {
    let mut out = join_segments(path);
    out.push('/');
    out
}

/// Normalize a file path: single leading slash, no repeated separators,
/// no trailing slash.
pub fn file_key(path: &str) -> String {
    let out = join_segments(path);
    if out.is_empty() {
        "/".to_string()
    } else {
        out
    }
}

/// Normalize the configured tree root (`/data` and `/data/` are the same root).
pub fn root_key(root: &str) -> String {
    dir_key(root)
}

/// Strip the leading slash for the `dir` request parameter.
///
/// The endpoint decides whether the value is relative to its own root.
pub fn request_dir(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

/// Slash-fix a chosen path for host consumption: leading slash, no
/// trailing slash. The root itself stays `/`.
pub fn fix_slashes(path: &str) -> String {
    file_key(path)
}

/// Whether a raw node path denotes a directory.
pub fn is_dir_path(path: &str) -> bool {
    path.ends_with('/')
}

/// Last path segment, ignoring a trailing slash (`/a/b/` -> `b`).
pub fn base_name(path: &str) -> &str {
    segments(path).last().unwrap_or("")
}

/// Parent directory of a node path (`/a/b.txt` -> `/a/`, `/a/` -> `/`).
///
/// Returns `None` for the root.
pub fn parent_dir(path: &str) -> Option<String> {
    let parts: Vec<&str> = segments(path).collect();
    if parts.is_empty() {
        return None;
    }
    let mut out = String::from("/");
    for part in &parts[..parts.len() - 1] {
        out.push_str(part);
        out.push('/');
    }
    Some(out)
}

/// Whether `dir` (a directory key) strictly contains `path`.
pub fn is_strict_ancestor(dir: &str, path: &str) -> bool {
    is_dir_path(dir) && path.len() > dir.len() && path.starts_with(dir)
}
