use std::path::{Path, PathBuf};

use path_slash::PathExt as _;

/// Get the user's home directory.
///
/// Uses the `home` crate which handles platform-specific detection:
/// - Unix: `$HOME` environment variable
/// - Windows: `USERPROFILE` or `HOMEDRIVE`/`HOMEPATH`
pub fn home_dir() -> Option<PathBuf> {
    home::home_dir()
}

/// Format a filesystem path for user-facing output.
///
/// Replaces home directory prefix with `~` (e.g., `/Users/alex/src/widgets` -> `~/src/widgets`).
/// Paths outside home are returned unchanged.
pub fn format_path_for_display(path: &Path) -> String {
    if let Some(home) = home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        if stripped.as_os_str().is_empty() {
            return "~".to_string();
        }

        let mut display_path = PathBuf::from("~");
        display_path.push(stripped);
        return display_path.display().to_string();
    }

    path.display().to_string()
}

/// Make `path` absolute and resolve symlinks where possible.
///
/// For files that do not exist (yet), the nearest existing ancestor is
/// canonicalized and the missing components are appended unchanged, so
/// unsaved files inside a symlinked checkout still sit under its real root.
pub fn normalize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = dunce::canonicalize(existing) {
            return missing
                .iter()
                .rev()
                .fold(canonical, |acc, name| acc.join(name));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }
    absolute
}

/// The directory VCS tools should run in when asked about `file`.
///
/// Walks up to the nearest existing directory so that tools still find the
/// repository for files that have not been written to disk.
pub fn working_dir_for(file: &Path) -> Option<PathBuf> {
    let mut dir = if file.is_dir() {
        file.to_path_buf()
    } else {
        file.parent()?.to_path_buf()
    };
    while !dir.is_dir() {
        if !dir.pop() {
            return None;
        }
    }
    Some(dir)
}

/// Path of `file` relative to `root`, always `/`-separated.
///
/// Empty when `file` is `root` itself or lies outside it.
pub fn relative_to_root(root: &Path, file: &Path) -> String {
    match file.strip_prefix(root) {
        Ok(relative) => relative.to_slash_lossy().into_owned(),
        Err(_) => String::new(),
    }
}

/// Drop everything up to and including the first `/`.
///
/// Paths without a separator are returned unchanged.
pub fn strip_first_segment(relative: &str) -> &str {
    relative
        .split_once('/')
        .map_or(relative, |(_, rest)| rest)
}
