//! Marker-based repository discovery.
//!
//! Walks up from a file looking for VCS metadata directories. Used for files
//! that no registered handler opens, so the resolver can still report a
//! relative path and name the VCS it cannot handle.

use std::path::{Path, PathBuf};

/// Metadata entries that identify a repository root, checked in order at
/// each directory level. `.jj` comes before `.git` so colocated jj
/// repositories are reported as jj.
const MARKERS: &[(&str, &str)] = &[
    (".jj", "Jujutsu"),
    (".git", "Git"),
    (".hg", "Mercurial"),
    (".svn", "Subversion"),
    (".bzr", "Bazaar"),
];

/// A repository found by its metadata directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedRepo {
    pub root: PathBuf,
    /// Human-readable VCS name (e.g., "Mercurial").
    pub vcs: &'static str,
}

/// Find the nearest enclosing repository of any known VCS.
///
/// `.git` may be a file (linked worktrees, submodules); other markers must
/// be directories.
pub fn discover_root(file: &Path) -> Option<DetectedRepo> {
    let mut current = if file.is_dir() {
        file.to_path_buf()
    } else {
        file.parent()?.to_path_buf()
    };

    loop {
        for &(marker, vcs) in MARKERS {
            let candidate = current.join(marker);
            let found = if marker == ".git" {
                candidate.exists()
            } else {
                candidate.is_dir()
            };
            if found {
                return Some(DetectedRepo {
                    root: current,
                    vcs,
                });
            }
        }

        if !current.pop() {
            return None;
        }
    }
}
