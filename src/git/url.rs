//! Remote URL parsing.
//!
//! Splits remote URLs into host, owner, and repository so a resolved remote
//! can be turned into a stable project identifier or a browsable URL.

/// Parsed remote URL with host, owner, and repository components.
///
/// # Supported URL formats
///
/// - `https://<host>/<owner>/<repo>.git` (also `http://`, `git://`)
/// - `ssh://[<user>@]<host>[:<port>]/<owner>/<repo>.git`
/// - `<user>@<host>:<owner>/<repo>.git` (scp-like syntax)
///
/// The owner may span several segments (GitLab subgroups): in
/// `https://gitlab.com/group/sub/repo` the owner is `group/sub`.
///
/// # Example
///
/// ```
/// use repoinfo::git::GitRemoteUrl;
///
/// let url = GitRemoteUrl::parse("git@github.com:acme/widgets.git").unwrap();
/// assert_eq!(url.host(), "github.com");
/// assert_eq!(url.owner(), "acme");
/// assert_eq!(url.repo(), "widgets");
/// assert_eq!(url.project_identifier(), "github.com/acme/widgets");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRemoteUrl {
    host: String,
    owner: String,
    repo: String,
}

impl GitRemoteUrl {
    /// Parse a remote URL into structured components.
    ///
    /// Returns `None` for malformed URLs, local paths, and schemes that do
    /// not name a host (`file://`).
    pub fn parse(url: &str) -> Option<Self> {
        let url = url.trim();

        let (host, path) = if let Some((scheme, rest)) = url.split_once("://") {
            if !matches!(scheme, "https" | "http" | "ssh" | "git" | "git+ssh") {
                return None;
            }
            let (authority, path) = rest.split_once('/')?;
            // Drop userinfo and port
            let host = authority.rsplit('@').next()?;
            let host = host.split(':').next()?;
            (host, path)
        } else {
            // scp-like: [user@]host:path, but not a Windows drive letter or local path
            let (authority, path) = url.split_once(':')?;
            if authority.contains('/') || authority.len() == 1 {
                return None;
            }
            let host = authority.rsplit('@').next()?;
            (host, path)
        };

        let path = path.trim_matches('/');
        let (owner, repo_with_suffix) = path.rsplit_once('/')?;
        let repo = repo_with_suffix
            .strip_suffix(".git")
            .unwrap_or(repo_with_suffix);

        if host.is_empty() || owner.is_empty() || repo.is_empty() {
            return None;
        }

        Some(Self {
            host: host.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    /// The hostname (e.g., "github.com", "gitlab.example.com").
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The repository owner, organization, or group path.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The repository name without .git suffix.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Project identifier in "host/owner/repo" format.
    pub fn project_identifier(&self) -> String {
        format!("{}/{}/{}", self.host, self.owner, self.repo)
    }
}
