//! Git queries used by the git [`VcsHandler`](crate::vcs::VcsHandler).

mod repository;
mod url;

pub use repository::Repository;
pub use url::GitRemoteUrl;
