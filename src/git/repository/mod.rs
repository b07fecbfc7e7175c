use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use once_cell::sync::OnceCell;

use crate::shell_exec::{Cmd, failure_message};

/// Cached values for git queries.
///
/// A `Repository` lives for one resolution, and these values don't change
/// during it, so they are looked up at most once.
#[derive(Debug, Default)]
struct RepoCache {
    toplevel: OnceCell<PathBuf>,
    current_branch: OnceCell<Option<String>>,
    primary_remote: OnceCell<String>,
}

/// Repository context for git queries.
///
/// Runs `git` with `path` as the working directory; `path` may be any
/// directory inside the working tree.
///
/// # Examples
///
/// ```no_run
/// use repoinfo::git::Repository;
///
/// let repo = Repository::at("/home/me/src/widgets/src");
/// let root = repo.toplevel()?;
/// let branch = repo.current_branch()?;
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug)]
pub struct Repository {
    path: PathBuf,
    cache: RepoCache,
}

impl Repository {
    /// Create a repository context at the specified path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RepoCache::default(),
        }
    }

    /// Root of the working tree containing the base path.
    ///
    /// Fails when the base path is not inside a git working tree (including
    /// when it is inside a `.git` directory or a bare repository).
    pub fn toplevel(&self) -> anyhow::Result<&Path> {
        self.cache
            .toplevel
            .get_or_try_init(|| {
                let stdout = self.run_command(&["rev-parse", "--show-toplevel"])?;
                let toplevel = PathBuf::from(stdout.trim());
                if toplevel.as_os_str().is_empty() {
                    bail!("Not inside a git working tree: {}", self.path.display());
                }
                Ok(dunce::canonicalize(&toplevel).unwrap_or(toplevel))
            })
            .map(PathBuf::as_path)
    }

    /// Get the current branch name, or None if in detached HEAD state.
    /// Result is cached for the lifetime of this Repository instance.
    pub fn current_branch(&self) -> anyhow::Result<Option<&str>> {
        self.cache
            .current_branch
            .get_or_try_init(|| {
                let stdout = self.run_command(&["branch", "--show-current"])?;
                let branch = stdout.trim();
                Ok(if branch.is_empty() {
                    None // Detached HEAD
                } else {
                    Some(branch.to_string())
                })
            })
            .map(|opt| opt.as_deref())
    }

    /// Get the primary remote name for this repository.
    ///
    /// Uses the following strategy:
    /// 1. Use git's [`checkout.defaultRemote`][1] config if set and has a URL
    /// 2. Otherwise, get the first remote with a configured URL
    /// 3. Fall back to "origin" if no remotes exist
    ///
    /// [1]: https://git-scm.com/docs/git-config#Documentation/git-config.txt-checkoutdefaultRemote
    pub fn primary_remote(&self) -> anyhow::Result<&str> {
        self.cache
            .primary_remote
            .get_or_try_init(|| {
                if let Some(default_remote) = self.get_config("checkout.defaultRemote")?
                    && !default_remote.is_empty()
                    && self.remote_has_url(&default_remote)
                {
                    return Ok(default_remote);
                }

                // Global config can define remotes without a URL (e.g.
                // `remote.origin.prunetags=true`), so look for `.url` keys only.
                let output = self
                    .run_command(&["config", "--get-regexp", r"remote\..+\.url"])
                    .unwrap_or_default();

                Ok(first_remote_with_url(&output)
                    .unwrap_or("origin")
                    .to_string())
            })
            .map(String::as_str)
    }

    /// The remote a branch tracks, when it tracks one with a URL.
    pub fn branch_remote(&self, branch: &str) -> anyhow::Result<Option<String>> {
        let remote = self.get_config(&format!("branch.{branch}.remote"))?;
        Ok(remote.filter(|remote| {
            // "." means the branch tracks another local branch
            remote != "." && self.remote_has_url(remote)
        }))
    }

    /// The remote to consult for `branch`: its upstream remote, or the
    /// primary remote when it has none.
    pub fn remote_for(&self, branch: Option<&str>) -> anyhow::Result<String> {
        if let Some(branch) = branch
            && let Some(remote) = self.branch_remote(branch)?
        {
            return Ok(remote);
        }
        Ok(self.primary_remote()?.to_string())
    }

    /// Check if a remote has a URL configured.
    fn remote_has_url(&self, remote: &str) -> bool {
        self.get_config(&format!("remote.{remote}.url"))
            .ok()
            .flatten()
            .is_some_and(|url| !url.is_empty())
    }

    /// Get the URL for a remote, if configured.
    ///
    /// Goes through `git remote get-url` so `url.<base>.insteadOf` rewrites
    /// are applied.
    pub fn remote_url(&self, remote: &str) -> Option<String> {
        self.run_command(&["remote", "get-url", remote])
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
    }

    /// Whether `refs/remotes/<remote>/<branch>` exists locally.
    ///
    /// This consults the last fetched state; no network access happens.
    pub fn remote_branch_exists(&self, remote: &str, branch: &str) -> anyhow::Result<bool> {
        self.run_command_check(&[
            "rev-parse",
            "--verify",
            "--quiet",
            &format!("refs/remotes/{remote}/{branch}"),
        ])
    }

    /// Get a git config value. Returns None if the key doesn't exist.
    pub fn get_config(&self, key: &str) -> anyhow::Result<Option<String>> {
        match self.run_command(&["config", "--get", key]) {
            Ok(value) => Ok(Some(value.trim().to_string())),
            Err(_) => Ok(None), // Config key doesn't exist
        }
    }

    /// Get a short display name for this repository, used in logging context.
    fn logging_context(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(".")
            .to_string()
    }

    /// Run a git command in this repository's context and return stdout.
    ///
    /// A non-zero exit status becomes an error carrying git's stderr.
    pub fn run_command(&self, args: &[&str]) -> anyhow::Result<String> {
        let output = Cmd::new("git")
            .args(args)
            .current_dir(&self.path)
            .context(self.logging_context())
            .run()
            .with_context(|| format!("Failed to execute: git {}", args.join(" ")))?;

        if !output.status.success() {
            let message = failure_message(&output);
            for line in message.lines() {
                log::debug!("  ! {}", line);
            }
            bail!("{}", message);
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        for line in stdout.trim().lines() {
            log::debug!("  {}", line);
        }
        Ok(stdout)
    }

    /// Run a git command and return whether it succeeded (exit code 0).
    pub fn run_command_check(&self, args: &[&str]) -> anyhow::Result<bool> {
        let output = Cmd::new("git")
            .args(args)
            .current_dir(&self.path)
            .context(self.logging_context())
            .run()
            .with_context(|| format!("Failed to execute: git {}", args.join(" ")))?;

        Ok(output.status.success())
    }
}

/// Name of the first remote in `git config --get-regexp 'remote\..+\.url'` output.
///
/// Lines look like `remote.<name>.url <value>`. Splitting on `.url ` keeps
/// remote names that contain dots intact (e.g. `my.remote`).
fn first_remote_with_url(output: &str) -> Option<&str> {
    output.lines().find_map(|line| {
        line.strip_prefix("remote.")
            .and_then(|s| s.split_once(".url "))
            .map(|(name, _)| name)
            .filter(|name| !name.is_empty())
    })
}
