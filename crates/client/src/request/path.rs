//! URL path normalization

/// Normalize a base or relative path.
///
/// Trims surrounding whitespace, turns backslashes into slashes and strips
/// trailing slashes. Leading slashes are kept.
pub fn normalize_path(path: &str) -> String {
    path.trim().replace('\\', "/").trim_end_matches('/').to_string()
}

/// Join a normalized base and a normalized path with exactly the separator
/// the two parts do not already supply.
pub(crate) fn join(base: &str, path: &str) -> String {
    match (base.is_empty(), path.is_empty()) {
        (true, _) => path.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{base}/{}", path.trim_start_matches('/')),
    }
}
