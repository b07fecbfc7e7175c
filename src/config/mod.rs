//! Configuration for repoinfo
//!
//! # User Config (~/.config/repoinfo/config.toml)
//!
//! **Purpose**: Personal preferences, not checked into any repository
//!
//! **Settings**:
//! - `default-branch` - Branch reported when the local branch has no remote
//!   counterpart (default: `main`)
//! - `remote-url-replacements` - Comma-separated find/replace pairs applied to
//!   remote URLs
//! - `[projects."<repository root>"]` - Per-repository overrides of the two
//!   settings above
//!
//! ```toml
//! default-branch = "main"
//! remote-url-replacements = "git.internal.example.com, github.com"
//!
//! [projects."/home/alex/src/legacy"]
//! default-branch = "master"
//! ```
//!
//! # Precedence
//!
//! Later sources override earlier ones:
//! 1. Built-in defaults
//! 2. Top-level keys of the config file
//! 3. Environment variables (`REPOINFO_DEFAULT_BRANCH`,
//!    `REPOINFO_REMOTE_URL_REPLACEMENTS`)
//! 4. The `[projects]` entry for the file's repository root
//! 5. Command-line flags

mod user;

pub use user::{
    DEFAULT_BRANCH, ProjectOverrides, ResolvedConfig, UserConfig, get_config_path,
    set_config_path,
};
