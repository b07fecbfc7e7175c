//! Error types for repository resolution.
//!
//! - **`ResolveError`** - the typed taxonomy returned to callers. Handlers
//!   report failures as `anyhow::Error`; typed errors raised inside a handler
//!   (for example [`ResolveError::PerforceAuthentication`]) survive the trip
//!   through `anyhow` and are recovered by downcasting.
//!
//! ```ignore
//! // Inside a handler
//! return Err(ResolveError::RepositoryNotFound { path }.into());
//!
//! // At the resolver boundary
//! let typed = ResolveError::from(err);
//! ```

use std::fmt;
use std::path::PathBuf;

use crate::path::format_path_for_display;

/// Why a file's repository information could not be fully determined.
#[derive(Debug)]
pub enum ResolveError {
    /// The file lives in a repository of a VCS that has no registered handler.
    UnsupportedVcs { vcs: String },

    /// No repository could be found for the file.
    RepositoryNotFound { path: PathBuf },

    /// The Perforce server rejected our credentials.
    PerforceAuthentication { message: String },

    /// Any other failure reported by a VCS tool.
    Vcs(anyhow::Error),
}

impl ResolveError {
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::PerforceAuthentication { .. })
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVcs { vcs } => write!(f, "Unsupported VCS: {vcs}"),
            Self::RepositoryNotFound { path } => write!(
                f,
                "Could not find repository for file {}",
                format_path_for_display(path)
            ),
            Self::PerforceAuthentication { message } => f.write_str(message),
            // `{:#}` keeps the context chain on one line
            Self::Vcs(err) => write!(f, "{err:#}"),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Vcs(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for ResolveError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ResolveError>() {
            Ok(typed) => typed,
            Err(err) => Self::Vcs(err),
        }
    }
}
