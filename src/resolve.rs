//! Repository information for a file.
//!
//! [`Resolver::resolve`] runs the lookup steps in order and stops at the first
//! failure, returning what it had computed so far inside [`ResolveFailure`]:
//!
//! 1. Detect the VCS: the first registered handler that opens the file.
//!    Every later step asks that one opened repository.
//! 2. Find the repository root. Files no handler opens still get a root
//!    when they live in a repository of some other VCS.
//! 3. Relative path (Perforce paths lose their leading depot directory).
//! 4. Branch: the local branch when the remote has it too, otherwise the
//!    configured default branch.
//! 5. Remote URL, rewritten by the configured replacements.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use serde::Serialize;

use crate::config::UserConfig;
use crate::error::ResolveError;
use crate::git::GitRemoteUrl;
use crate::notify::NotificationSink;
use crate::path::{format_path_for_display, normalize, relative_to_root, strip_first_segment};
use crate::vcs::{
    DetectedRepo, VcsHandler, VcsKind, VcsRepository, default_handlers, discover_root,
};

/// Prefix of notifications about Perforce authentication failures.
pub const AUTH_ERROR_PREFIX: &str = "Perforce authentication error: ";
/// Prefix of every other failure notification.
pub const GENERIC_ERROR_PREFIX: &str = "Error determining repository info: ";

/// Where a file lives in version control.
///
/// Fields that could not be determined are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepoInfo {
    pub vcs_type: VcsKind,
    pub remote_url: String,
    pub branch_name: String,
    /// Path from the repository root, `/`-separated.
    pub relative_path: String,
}

impl RepoInfo {
    /// Everything empty except the VCS type.
    pub fn empty(vcs_type: VcsKind) -> Self {
        Self {
            vcs_type,
            ..Default::default()
        }
    }

    /// `host/owner/repo` for git-style remote URLs.
    pub fn project_identifier(&self) -> Option<String> {
        GitRemoteUrl::parse(&self.remote_url).map(|url| url.project_identifier())
    }
}

/// A failed resolution and the fields computed before it failed.
#[derive(Debug)]
pub struct ResolveFailure {
    pub partial: RepoInfo,
    pub error: ResolveError,
}

impl ResolveFailure {
    /// The message to show the user.
    pub fn notification_message(&self) -> String {
        let prefix = if self.error.is_authentication() {
            AUTH_ERROR_PREFIX
        } else {
            GENERIC_ERROR_PREFIX
        };
        format!("{prefix}{}", self.error)
    }

    pub fn into_partial(self) -> RepoInfo {
        self.partial
    }
}

impl fmt::Display for ResolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notification_message())
    }
}

impl std::error::Error for ResolveFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Resolves [`RepoInfo`] using a set of registered VCS handlers.
pub struct Resolver {
    handlers: Vec<Box<dyn VcsHandler>>,
    config: UserConfig,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<VcsKind> = self.handlers.iter().map(|h| h.kind()).collect();
        f.debug_struct("Resolver")
            .field("handlers", &kinds)
            .field("config", &self.config)
            .finish()
    }
}

impl Resolver {
    /// A resolver that probes `handlers` in order.
    pub fn new(handlers: Vec<Box<dyn VcsHandler>>, config: UserConfig) -> Self {
        Self { handlers, config }
    }

    /// A resolver for git and Perforce.
    pub fn with_default_handlers(config: UserConfig) -> Self {
        Self::new(default_handlers(), config)
    }

    /// Add a handler, probed after the ones already registered.
    pub fn register(&mut self, handler: Box<dyn VcsHandler>) -> &mut Self {
        self.handlers.push(handler);
        self
    }

    pub fn config(&self) -> &UserConfig {
        &self.config
    }

    /// Resolve repository information for `file`.
    ///
    /// Files outside any repository are not an error: they resolve to an
    /// empty [`RepoInfo`] carrying only the detected VCS type.
    pub fn resolve(&self, file: &Path) -> Result<RepoInfo, ResolveFailure> {
        let t0 = Instant::now();
        let file = normalize(file);
        let result = self.resolve_normalized(&file);
        log::debug!(
            "[repoinfo-trace] resolve file={} dur={:.1}ms ok={}",
            file.display(),
            t0.elapsed().as_secs_f64() * 1000.0,
            result.is_ok()
        );
        result
    }

    /// Resolve, reporting a failure through `sink` and the log.
    ///
    /// Never fails: on error the partially filled [`RepoInfo`] is returned
    /// after exactly one notification and one log entry.
    pub fn resolve_or_notify(&self, file: &Path, sink: &dyn NotificationSink) -> RepoInfo {
        match self.resolve(file) {
            Ok(info) => info,
            Err(failure) => {
                let message = failure.notification_message();
                log::warn!("{message}");
                sink.show(&message);
                failure.into_partial()
            }
        }
    }

    fn resolve_normalized(&self, file: &Path) -> Result<RepoInfo, ResolveFailure> {
        // Without a handler, fall back to looking for metadata directories so
        // we can still name the VCS in the error.
        let (vcs_type, found) = match self.detect(file) {
            Some((kind, repo)) => (kind, Found::Handled(repo)),
            None => match discover_root(file) {
                Some(detected) => (VcsKind::Unknown, Found::Unsupported(detected)),
                None => {
                    log::debug!("No repository root for {}", format_path_for_display(file));
                    return Ok(RepoInfo::empty(VcsKind::Unknown));
                }
            },
        };
        let mut info = RepoInfo::empty(vcs_type);

        let (root, repo) = match &found {
            Found::Handled(repo) => (repo.root_path(), Some(repo.as_ref())),
            Found::Unsupported(detected) => (detected.root.as_path(), None),
        };
        let settings = self.config.resolved(Some(root));

        let relative = relative_to_root(root, file);
        info.relative_path = match vcs_type {
            VcsKind::Perforce => strip_first_segment(&relative).to_string(),
            _ => relative,
        };

        let fail = |info: &RepoInfo, error: ResolveError| ResolveFailure {
            partial: info.clone(),
            error,
        };

        let local_branch = match repo {
            Some(repo) => repo.current_branch().map_err(|e| fail(&info, e.into()))?,
            None => None,
        };
        info.branch_name = match (repo, local_branch) {
            (Some(repo), Some(branch))
                if repo
                    .remote_branch_exists(&branch)
                    .map_err(|e| fail(&info, e.into()))? =>
            {
                branch
            }
            (_, branch) => {
                if let Some(branch) = branch {
                    log::debug!(
                        "Branch {branch} has no remote counterpart, using {}",
                        settings.default_branch
                    );
                }
                settings.default_branch.clone()
            }
        };

        let remote_url = match &found {
            Found::Handled(repo) => repo.remote_url().map_err(ResolveError::from),
            Found::Unsupported(detected) => Err(ResolveError::UnsupportedVcs {
                vcs: detected.vcs.to_string(),
            }),
        }
        .map_err(|error| fail(&info, error))?;

        info.remote_url = settings.replacements.apply(&remote_url);
        Ok(info)
    }

    /// Open `file` with the first handler that manages it.
    fn detect(&self, file: &Path) -> Option<(VcsKind, Box<dyn VcsRepository + '_>)> {
        let (kind, repo) = self
            .handlers
            .iter()
            .find_map(|h| h.open(file).map(|repo| (h.kind(), repo)))?;
        log::debug!(
            "{} claimed by {kind} handler, root {}",
            format_path_for_display(file),
            format_path_for_display(repo.root_path())
        );
        Some((kind, repo))
    }
}

/// What manages a file: an opened repository, or a VCS we can only name.
enum Found<'a> {
    Handled(Box<dyn VcsRepository + 'a>),
    Unsupported(DetectedRepo),
}
