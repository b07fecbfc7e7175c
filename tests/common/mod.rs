// Not every test binary uses every helper.
#![allow(dead_code)]

//! # Test Utilities for repoinfo
//!
//! `TestRepo` creates an isolated git repository in a temporary directory.
//! Each test gets a fresh repo that is cleaned up when the test ends.
//!
//! ## Environment Isolation
//!
//! Git and repoinfo commands are configured per `Command` with `Command::env()`:
//! - No interference from global or system git config
//! - A private repoinfo config file (`REPOINFO_CONFIG_PATH`)
//! - `HOME` pointing at the temp directory, so paths display as `~/repo`
//! - Colors disabled, so output can be compared as plain text
//!
//! Nothing mutates the test process's own environment, so tests run in
//! parallel safely.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

#[cfg(unix)]
const NULL_DEVICE: &str = "/dev/null";
#[cfg(windows)]
const NULL_DEVICE: &str = "NUL";

/// Basic repo fixture: `main` branch with one commit, no remotes.
///
/// ```ignore
/// #[rstest]
/// fn test_something(repo: TestRepo) {
///     let file = repo.write_file("src/a.go", "package main\n");
/// }
/// ```
#[rstest::fixture]
pub fn repo() -> TestRepo {
    TestRepo::new()
}

/// Repo whose `main` is present on an `origin` remote.
#[rstest::fixture]
pub fn repo_with_remote(repo: TestRepo) -> TestRepo {
    repo.add_remote("origin", "https://github.com/acme/widgets.git");
    repo.add_remote_branch("origin", "main");
    repo
}

/// Canonicalize a path without Windows verbatim prefixes.
pub fn canonicalize(path: &Path) -> std::io::Result<PathBuf> {
    dunce::canonicalize(path)
}

/// Configure a git command with an isolated environment.
pub fn configure_git_cmd(cmd: &mut Command, git_config_path: &Path) {
    cmd.env("GIT_CONFIG_GLOBAL", git_config_path);
    cmd.env("GIT_CONFIG_SYSTEM", NULL_DEVICE);
    cmd.env("GIT_CONFIG_NOSYSTEM", "1");
    cmd.env("GIT_AUTHOR_DATE", "2025-01-01T00:00:00Z");
    cmd.env("GIT_COMMITTER_DATE", "2025-01-01T00:00:00Z");
    cmd.env("LC_ALL", "C");
    cmd.env("LANG", "C");
    cmd.env("GIT_TERMINAL_PROMPT", "0");
}

/// Panic with git's stderr if a command failed.
pub fn check_git_status(output: &Output, cmd_desc: &str) {
    if !output.status.success() {
        panic!(
            "git {cmd_desc} failed:\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

pub struct TestRepo {
    temp_dir: TempDir, // Must keep to ensure cleanup on drop
    root: PathBuf,
    /// Fake home directory; the repo lives at `~/repo`
    home: PathBuf,
    /// Isolated repoinfo config for this test
    test_config_path: PathBuf,
    /// Git config file with test settings
    git_config_path: PathBuf,
}

impl TestRepo {
    /// Create a new test repository with one commit on `main`.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        // Canonicalize to resolve symlinks (macOS /var -> /private/var)
        let home = canonicalize(temp_dir.path()).unwrap();
        let root = home.join("repo");
        std::fs::create_dir(&root).unwrap();

        let test_config_path = home.join("test-config.toml");
        let git_config_path = home.join("test-gitconfig");
        std::fs::write(
            &git_config_path,
            "[user]\n\tname = Test User\n\temail = test@example.com\n\
             [init]\n\tdefaultBranch = main\n",
        )
        .unwrap();

        let repo = Self {
            temp_dir,
            root,
            home,
            test_config_path,
            git_config_path,
        };

        repo.run_git(&["init", "-q"]);
        repo.write_file("README.md", "# widgets\n");
        repo.run_git(&["add", "README.md"]);
        repo.run_git(&["commit", "-q", "-m", "Initial commit"]);
        repo
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    pub fn home_path(&self) -> &Path {
        &self.home
    }

    /// A directory next to the repo that is not under version control.
    pub fn outside_path(&self) -> PathBuf {
        let dir = self.home.join("scratch");
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    pub fn configure_git_cmd(&self, cmd: &mut Command) {
        configure_git_cmd(cmd, &self.git_config_path);
    }

    pub fn git_command(&self) -> Command {
        let mut cmd = Command::new("git");
        self.configure_git_cmd(&mut cmd);
        cmd.current_dir(&self.root);
        cmd
    }

    pub fn run_git(&self, args: &[&str]) {
        let output = self.git_command().args(args).output().unwrap();
        check_git_status(&output, &args.join(" "));
    }

    pub fn git_output(&self, args: &[&str]) -> String {
        let output = self.git_command().args(args).output().unwrap();
        check_git_status(&output, &args.join(" "));
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Write a file relative to the repo root, creating parent directories.
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn add_remote(&self, name: &str, url: &str) {
        self.run_git(&["remote", "add", name, url]);
    }

    /// Record `branch` as present on `remote`, as a fetch would.
    pub fn add_remote_branch(&self, remote: &str, branch: &str) {
        self.run_git(&[
            "update-ref",
            &format!("refs/remotes/{remote}/{branch}"),
            "HEAD",
        ]);
    }

    pub fn checkout_new_branch(&self, branch: &str) {
        self.run_git(&["checkout", "-q", "-b", branch]);
    }

    /// Write the repoinfo user config for this test.
    pub fn write_config(&self, content: &str) {
        std::fs::write(&self.test_config_path, content).unwrap();
    }

    /// Configure a repoinfo command with the isolated environment.
    pub fn configure_repoinfo_cmd(&self, cmd: &mut Command) {
        self.configure_git_cmd(cmd);
        cmd.env("REPOINFO_CONFIG_PATH", &self.test_config_path);
        cmd.env("HOME", &self.home);
        cmd.env("XDG_CONFIG_HOME", self.home.join(".config"));
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("CLICOLOR_FORCE");
        cmd.env_remove("RUST_LOG");
        cmd.env_remove("REPOINFO_DEFAULT_BRANCH");
        cmd.env_remove("REPOINFO_REMOTE_URL_REPLACEMENTS");
        // Keep a developer's p4 settings from reaching a real server
        cmd.env("P4PORT", "localhost:1");
        cmd.env_remove("P4CONFIG");
    }

    /// `repoinfo` running in the repo root.
    pub fn repoinfo_command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_repoinfo"));
        self.configure_repoinfo_cmd(&mut cmd);
        cmd.current_dir(&self.root);
        cmd
    }

    /// Run `repoinfo` with `args` and return its output.
    pub fn repoinfo(&self, args: &[&str]) -> Output {
        self.repoinfo_command().args(args).output().unwrap()
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
