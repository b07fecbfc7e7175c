//! Repository information for files under version control.
//!
//! Given a file, [`Resolver`] reports which VCS manages it, the canonical
//! remote URL, the branch to link to, and the path from the repository root:
//!
//! ```no_run
//! use std::path::Path;
//! use repoinfo::{Resolver, StderrNotifier, UserConfig};
//!
//! let resolver = Resolver::with_default_handlers(UserConfig::load()?);
//! let info = resolver.resolve_or_notify(Path::new("src/lib.rs"), &StderrNotifier);
//! println!("{} {}", info.remote_url, info.relative_path);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Git and Perforce are supported out of the box by shelling out to `git`
//! and `p4`. Other systems plug in through [`vcs::VcsHandler`].

pub mod config;
pub mod error;
pub mod git;
pub mod notify;
pub mod path;
pub mod replacements;
pub mod resolve;
pub mod shell_exec;
pub mod styling;
pub mod vcs;

pub use config::UserConfig;
pub use error::ResolveError;
pub use notify::{CollectingNotifier, NotificationSink, SilentNotifier, StderrNotifier};
pub use resolve::{RepoInfo, ResolveFailure, Resolver};
pub use vcs::{VcsHandler, VcsKind, VcsRepository};
