//! User configuration loading and per-repository resolution.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, bail};
#[cfg(not(test))]
use etcetera::base_strategy::{BaseStrategy, choose_base_strategy};
use serde::{Deserialize, Serialize};

use crate::path::{format_path_for_display, home_dir, normalize};
use crate::replacements::UrlReplacements;

/// Branch reported when nothing else is configured.
pub const DEFAULT_BRANCH: &str = "main";

/// Override for user config path, set via --config CLI flag
static CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Set the user config path override (called from CLI --config flag)
pub fn set_config_path(path: PathBuf) {
    CONFIG_PATH.set(path).ok();
}

/// Settings that can be given globally, per project, or on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url_replacements: Option<String>,
}

impl ProjectOverrides {
    fn apply_to(&self, resolved: &mut Layered) {
        // A blank branch never replaces a usable one
        if let Some(branch) = self.default_branch.as_deref().filter(|b| !is_blank(b)) {
            resolved.default_branch = branch.to_string();
        }
        if let Some(replacements) = &self.remote_url_replacements {
            resolved.replacements = replacements.clone();
        }
    }
}

/// User-level configuration.
///
/// See the [module documentation](super) for the file format and precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserConfig {
    /// Branch reported when the local branch has no same-named remote branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,

    /// Comma-separated find/replace pairs applied to remote URLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url_replacements: Option<String>,

    /// Overrides keyed by repository root path (`~` is expanded).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub projects: BTreeMap<String, ProjectOverrides>,

    /// Command-line overrides; these win over every other source.
    #[serde(skip)]
    pub overrides: ProjectOverrides,

    /// Keys we don't recognize, reported once at load time.
    #[serde(flatten, default, skip_serializing)]
    unknown: BTreeMap<String, toml::Value>,
}

/// Effective settings for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub default_branch: String,
    pub replacements: UrlReplacements,
}

/// Intermediate state while layering sources.
struct Layered {
    default_branch: String,
    replacements: String,
}

impl UserConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// A missing config file is not an error. A file that exists but does not
    /// parse, or sets an invalid value, is.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match get_config_path() {
            Some(path) if path.exists() => Self::load_from_file(&path)?,
            Some(path) => {
                log::debug!("No config file at {}", format_path_for_display(&path));
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", format_path_for_display(path)))?;
        let config = Self::load_from_str(&content).with_context(|| {
            format!(
                "Failed to parse config file {}",
                format_path_for_display(path)
            )
        })?;

        for key in config.unknown_keys() {
            log::warn!(
                "Unknown key '{key}' in {} will be ignored",
                format_path_for_display(path)
            );
        }
        Ok(config)
    }

    /// Top-level keys that were present but not recognized.
    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.unknown.keys().map(String::as_str)
    }

    /// Parse configuration from a TOML string.
    pub fn load_from_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `REPOINFO_*` environment variables on top of the file's
    /// top-level keys.
    pub(crate) fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(branch) = lookup("REPOINFO_DEFAULT_BRANCH") {
            self.default_branch = Some(branch);
        }
        if let Some(replacements) = lookup("REPOINFO_REMOTE_URL_REPLACEMENTS") {
            self.remote_url_replacements = Some(replacements);
        }
    }

    /// Reject settings that would produce an empty branch name.
    ///
    /// Runs on load; call it again after filling in [`overrides`](Self::overrides).
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.default_branch.as_deref().is_some_and(is_blank) {
            bail!("default-branch cannot be empty");
        }
        for (project, overrides) in &self.projects {
            if overrides.default_branch.as_deref().is_some_and(is_blank) {
                bail!("projects.\"{project}\".default-branch cannot be empty");
            }
        }
        if self.overrides.default_branch.as_deref().is_some_and(is_blank) {
            bail!("--default-branch cannot be empty");
        }
        Ok(())
    }

    /// The `[projects]` entry whose key names `root`, if any.
    pub fn project_overrides(&self, root: &Path) -> Option<&ProjectOverrides> {
        let root = normalize(root);
        self.projects
            .iter()
            .find(|(key, _)| normalize(&expand_tilde(key)) == root)
            .map(|(_, overrides)| overrides)
    }

    /// Effective settings for the repository rooted at `root`.
    ///
    /// Without a root only global settings and overrides apply.
    pub fn resolved(&self, root: Option<&Path>) -> ResolvedConfig {
        let mut layered = Layered {
            default_branch: DEFAULT_BRANCH.to_string(),
            replacements: String::new(),
        };

        ProjectOverrides {
            default_branch: self.default_branch.clone(),
            remote_url_replacements: self.remote_url_replacements.clone(),
        }
        .apply_to(&mut layered);

        if let Some(project) = root.and_then(|root| self.project_overrides(root)) {
            project.apply_to(&mut layered);
        }
        self.overrides.apply_to(&mut layered);

        ResolvedConfig {
            default_branch: layered.default_branch,
            replacements: UrlReplacements::parse(&layered.replacements),
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn expand_tilde(key: &str) -> PathBuf {
    if key == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from(key));
    }
    match (key.strip_prefix("~/"), home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(key),
    }
}

pub fn get_config_path() -> Option<PathBuf> {
    // Priority 1: CLI --config flag
    if let Some(path) = CONFIG_PATH.get() {
        return Some(path.clone());
    }

    // Priority 2: Environment variable (also used by tests)
    if let Ok(path) = std::env::var("REPOINFO_CONFIG_PATH") {
        return Some(PathBuf::from(path));
    }

    // Unit tests never read the real user config
    #[cfg(test)]
    return None;

    // choose_base_strategy uses XDG on Linux and macOS, %APPDATA% on Windows
    #[cfg(not(test))]
    {
        let strategy = choose_base_strategy().ok()?;
        Some(strategy.config_dir().join("repoinfo").join("config.toml"))
    }
}
