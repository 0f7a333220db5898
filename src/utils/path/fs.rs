//! Path normalization utilities.
//!
//! Provides consistent path handling across the codebase:
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `normalize_watch_path` - stable key for a file that may not exist yet
//! - `expand_path` / `expand_path_in` - `~` expansion + normalization for user input

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Normalize a path whose file may be missing.
///
/// Editors replace files by rename, so the file itself can be absent at the
/// moment an event arrives. The parent directory is canonicalized instead
/// and the file name re-attached, giving the same key either way.
pub fn normalize_watch_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            normalize_path(parent).join(name)
        }
        _ => normalize_path(path),
    }
}

/// Expand `~` and environment variables, then normalize.
pub fn expand_path(raw: &str) -> PathBuf {
    normalize_watch_path(&expand(raw))
}

/// Like [`expand_path`], but relative input is taken relative to `base`.
pub fn expand_path_in(base: &Path, raw: &str) -> PathBuf {
    let expanded = expand(raw);
    if expanded.is_absolute() {
        normalize_watch_path(&expanded)
    } else {
        normalize_watch_path(&base.join(expanded))
    }
}

fn expand(raw: &str) -> PathBuf {
    shellexpand::full(raw).map_or_else(|_| raw.into(), |s| PathBuf::from(s.as_ref()))
}
