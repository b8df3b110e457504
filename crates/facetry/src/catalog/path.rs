//! Helpers for `" > "`-delimited category breadcrumbs.

/// Separator used when joining path segments.
pub const SEPARATOR: &str = " > ";

/// Splits a breadcrumb on `>` and trims every segment.
///
/// Empty segments are kept so callers can decide whether to reject them.
pub fn split(raw: &str) -> Vec<String> {
    raw.split('>').map(|s| s.trim().to_string()).collect()
}

/// Joins segments with the canonical separator.
pub fn join<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Segments of an already-canonical path.
pub fn segments(path: &str) -> Vec<&str> {
    path.split(SEPARATOR).collect()
}

/// Returns true if `path` is `prefix` itself or lies below it.
pub fn is_at_or_under(path: &str, prefix: &str) -> bool {
    path == prefix || is_strictly_under(path, prefix)
}

/// Returns true if `path` lies below `prefix` (not equal to it).
pub fn is_strictly_under(path: &str, prefix: &str) -> bool {
    path.len() > prefix.len() + SEPARATOR.len()
        && path.starts_with(prefix)
        && path[prefix.len()..].starts_with(SEPARATOR)
}

/// Keeps at most `depth` leading segments of `path`.
pub fn truncate(path: &str, depth: usize) -> String {
    let segs = segments(path);
    if depth == 0 || segs.len() <= depth {
        return path.to_string();
    }
    join(&segs[..depth])
}
