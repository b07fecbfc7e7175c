//! Git implementation of the [`VcsHandler`] trait.

use std::path::{Path, PathBuf};

use anyhow::anyhow;

use super::{VcsHandler, VcsKind, VcsRepository};
use crate::git::Repository;
use crate::path::{format_path_for_display, working_dir_for};

/// Git-backed handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitHandler;

impl VcsHandler for GitHandler {
    fn kind(&self) -> VcsKind {
        VcsKind::Git
    }

    fn open(&self, file: &Path) -> Option<Box<dyn VcsRepository + '_>> {
        let repo = Repository::at(working_dir_for(file)?);
        let root = match repo.toplevel() {
            Ok(root) => root.to_path_buf(),
            Err(e) => {
                log::debug!("Not a git working tree: {}: {e:#}", file.display());
                return None;
            }
        };
        Some(Box::new(GitCheckout { repo, root }))
    }
}

/// A working tree opened for one resolution.
///
/// Every lookup goes through the same [`Repository`], so the branch and
/// remote are queried at most once.
#[derive(Debug)]
struct GitCheckout {
    repo: Repository,
    root: PathBuf,
}

impl VcsRepository for GitCheckout {
    fn root_path(&self) -> &Path {
        &self.root
    }

    fn current_branch(&self) -> anyhow::Result<Option<String>> {
        Ok(self.repo.current_branch()?.map(str::to_string))
    }

    fn remote_branch_exists(&self, branch: &str) -> anyhow::Result<bool> {
        let remote = self.repo.remote_for(Some(branch))?;
        let exists = self.repo.remote_branch_exists(&remote, branch)?;
        log::debug!("Branch {branch} on remote {remote}: exists={exists}");
        Ok(exists)
    }

    fn remote_url(&self) -> anyhow::Result<String> {
        let branch = self.repo.current_branch()?;
        let remote = self.repo.remote_for(branch)?;
        self.repo.remote_url(&remote).ok_or_else(|| {
            anyhow!(
                "No URL configured for remote '{remote}' in {}",
                format_path_for_display(&self.root)
            )
        })
    }
}
