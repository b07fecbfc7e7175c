//! VCS-agnostic handler abstraction.
//!
//! This module provides the [`VcsHandler`] trait that captures the questions
//! the resolver asks about a file, independent of the VCS that manages it.
//!
//! The git implementation ([`GitHandler`]) and the Perforce implementation
//! ([`PerforceHandler`]) shell out to `git` and `p4`. A handler whose tool is
//! not installed simply never opens a file, so registering handlers for
//! tools that may be missing is always safe.
//!
//! [`VcsHandler::open`] returns a [`VcsRepository`] scoped to one resolution;
//! the git one shares a single [`Repository`](crate::git::Repository) across
//! all lookups.
//!
//! Use [`discover_root`] to find repositories of VCSs without a handler.

pub(crate) mod detect;
mod git;
mod perforce;

use std::path::Path;

pub use detect::{DetectedRepo, discover_root};
pub use git::GitHandler;
pub use perforce::{ClientInfo, PerforceHandler};

/// Version control system type.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VcsKind {
    Git,
    Perforce,
    #[default]
    Unknown,
}

/// Entry point for one VCS.
///
/// Handlers hold no per-file state. Each resolution opens a fresh
/// [`VcsRepository`] and asks it every question.
pub trait VcsHandler: Send + Sync {
    /// Which VCS this handler speaks for.
    fn kind(&self) -> VcsKind;

    /// The repository (or Perforce client) managing `file`, or `None` when
    /// this VCS does not manage it.
    ///
    /// `file` is absolute. Must not fail: a missing tool or unreachable
    /// server means "no".
    fn open(&self, file: &Path) -> Option<Box<dyn VcsRepository + '_>>;
}

/// Lookups for one file inside an opened repository.
///
/// Lives for a single resolution, so implementations may memoize VCS
/// queries for as long as the value exists.
pub trait VcsRepository {
    /// Root directory of the repository or client workspace.
    fn root_path(&self) -> &Path;

    /// Current local branch, or `None` when the VCS has no branch concept
    /// or the checkout is detached.
    fn current_branch(&self) -> anyhow::Result<Option<String>>;

    /// Whether the remote the branch would be pushed to has `branch`.
    fn remote_branch_exists(&self, branch: &str) -> anyhow::Result<bool>;

    /// Canonical remote URL of the repository.
    fn remote_url(&self) -> anyhow::Result<String>;
}

/// Handlers for every VCS this crate supports, in probing order.
pub fn default_handlers() -> Vec<Box<dyn VcsHandler>> {
    vec![Box::new(GitHandler), Box::new(PerforceHandler::new())]
}
