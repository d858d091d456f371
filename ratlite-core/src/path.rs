//! Translation of cutout names to filesystem locations

use std::path::{Path, PathBuf};

/// Append `suffix` to `name` unless it already carries it
pub fn with_suffix(name: &str, suffix: &str) -> String {
    let dotted = format!(".{}", suffix);
    if name.ends_with(&dotted) {
        name.to_string()
    } else {
        format!("{}{}", name, dotted)
    }
}

/// Translate a cutout `name` into the path of a single-file store or of an old-style
/// cutout directory.
///
/// When the caller has no in-memory data the candidates are tried in order:
///
/// 1. `<cwd>/<name>.<suffix>` as a file
/// 2. `<cutout_dir>/<name>.<suffix>` as a file
/// 3. `<cwd>/<name>` as a directory
/// 4. `<cutout_dir>/<name>` as a directory
///
/// The directory candidates use `name` without the suffix, so `europe.json`
/// also finds an old-style `europe/` directory. `name` is never looked up as a
/// directory exactly as given.
///
/// Without a match (or with in-memory data) the location a new cutout would be
/// written to is returned, which need not exist: `<cutout_dir>/<name>.<suffix>` if a
/// cutout directory is configured, `<cwd>/<name>.<suffix>` otherwise.
pub fn ensure_path(
    name: &str,
    has_data: bool,
    cutout_dir: Option<&Path>,
    cwd: &Path,
    suffix: &str,
) -> PathBuf {
    let name_with_suffix = with_suffix(name, suffix);
    let dotted = format!(".{}", suffix);
    let bare_name = name.strip_suffix(dotted.as_str()).unwrap_or(name);

    if !has_data {
        let candidates = [
            (Some(cwd), name_with_suffix.as_str(), false),
            (cutout_dir, name_with_suffix.as_str(), false),
            (Some(cwd), bare_name, true),
            (cutout_dir, bare_name, true),
        ];

        for (dir, candidate, is_dir) in candidates {
            let Some(dir) = dir else { continue };
            let path = dir.join(candidate);
            let exists = if is_dir { path.is_dir() } else { path.is_file() };
            if exists {
                return path;
            }
        }
    }

    cutout_dir.unwrap_or(cwd).join(name_with_suffix)
}
