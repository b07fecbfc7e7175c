//! Perforce implementation of the [`VcsHandler`] trait.
//!
//! Implements the lookups by shelling out to `p4 -ztag` and parsing its
//! tagged output. Connection settings (`P4PORT`, `P4CLIENT`, `P4USER`,
//! `P4CONFIG` files) are picked up by `p4` itself from the environment and
//! from the directory the command runs in.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow, bail};

use super::{VcsHandler, VcsKind, VcsRepository};
use crate::error::ResolveError;
use crate::path::working_dir_for;
use crate::shell_exec::{Cmd, failure_message};

/// One record of `p4 -ztag` output.
type Record = BTreeMap<String, String>;

/// The client workspace that maps a directory, as reported by `p4 info`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub client_name: Option<String>,
    /// Local root of the client workspace; `None` when no client is set.
    pub client_root: Option<PathBuf>,
    /// Server address as configured, e.g. `ssl:perforce.example.com:1666`.
    pub server_address: Option<String>,
}

impl ClientInfo {
    fn from_record(record: &Record) -> Self {
        let known = |key: &str| {
            record
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty() && *v != "*unknown*")
                .map(str::to_string)
        };
        Self {
            client_name: known("clientName"),
            client_root: known("clientRoot").map(|root| {
                let root = PathBuf::from(root);
                dunce::canonicalize(&root).unwrap_or(root)
            }),
            // `p4 info` reports the configured address as `serverAddress`;
            // older servers only report `serverName`.
            server_address: known("serverAddress").or_else(|| known("serverName")),
        }
    }
}

/// Perforce-backed handler.
#[derive(Debug, Clone)]
pub struct PerforceHandler {
    program: String,
}

impl Default for PerforceHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl PerforceHandler {
    pub fn new() -> Self {
        Self::with_program("p4")
    }

    /// Use a specific `p4` executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Client workspace information for `dir`.
    pub fn client_info(&self, dir: &Path) -> anyhow::Result<ClientInfo> {
        let output = self.run(dir, &["info"])?;
        let records = parse_ztag(&output);
        let record = records
            .first()
            .ok_or_else(|| anyhow!("p4 info returned no data"))?;
        Ok(ClientInfo::from_record(record))
    }

    /// Depot path (`//depot/...`) that `file` maps to.
    ///
    /// Files the client view does not map fail with
    /// [`ResolveError::RepositoryNotFound`].
    pub fn depot_path(&self, file: &Path) -> anyhow::Result<String> {
        let dir = working_dir_for(file)
            .ok_or_else(|| anyhow!("No existing directory for {}", file.display()))?;
        let file_arg = file.to_string_lossy();
        let output = self.run(&dir, &["where", &file_arg])?;
        parse_ztag(&output)
            .into_iter()
            // Unmapped lines are reported with an `unmap` key
            .find(|record| !record.contains_key("unmap"))
            .and_then(|mut record| record.remove("depotFile"))
            .ok_or_else(|| {
                ResolveError::RepositoryNotFound {
                    path: file.to_path_buf(),
                }
                .into()
            })
    }

    /// Run `p4 -ztag <args>` in `dir` and return stdout.
    fn run(&self, dir: &Path, args: &[&str]) -> anyhow::Result<String> {
        let output = Cmd::new(self.program.as_str())
            .arg("-ztag")
            .args(args)
            .current_dir(dir)
            .context("p4")
            .run()
            .with_context(|| format!("Failed to execute: {} {}", self.program, args.join(" ")))?;

        // p4 reports some errors on stdout with a zero exit status
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() || !stderr.trim().is_empty() {
            let message = failure_message(&output);
            if is_authentication_failure(&message) {
                return Err(ResolveError::PerforceAuthentication { message }.into());
            }
            bail!("{}", message);
        }
        Ok(stdout)
    }
}

impl VcsHandler for PerforceHandler {
    fn kind(&self) -> VcsKind {
        VcsKind::Perforce
    }

    fn open(&self, file: &Path) -> Option<Box<dyn VcsRepository + '_>> {
        let dir = working_dir_for(file)?;
        let info = match self.client_info(&dir) {
            Ok(info) => info,
            Err(e) => {
                log::debug!("No Perforce client for {}: {e:#}", dir.display());
                return None;
            }
        };
        let root = info.client_root.clone()?;
        if !file.starts_with(&root) {
            log::debug!("{} is outside client root {}", file.display(), root.display());
            return None;
        }
        Some(Box::new(PerforceFile {
            handler: self,
            file: file.to_path_buf(),
            root,
            info,
        }))
    }
}

/// A file inside a Perforce client workspace.
#[derive(Debug)]
struct PerforceFile<'a> {
    handler: &'a PerforceHandler,
    file: PathBuf,
    root: PathBuf,
    info: ClientInfo,
}

impl VcsRepository for PerforceFile<'_> {
    fn root_path(&self) -> &Path {
        &self.root
    }

    fn current_branch(&self) -> anyhow::Result<Option<String>> {
        Ok(None)
    }

    fn remote_branch_exists(&self, _branch: &str) -> anyhow::Result<bool> {
        Ok(false)
    }

    fn remote_url(&self) -> anyhow::Result<String> {
        let address = self
            .info
            .server_address
            .as_deref()
            .ok_or_else(|| anyhow!("Perforce server address is not configured"))?;
        let depot_path = self.handler.depot_path(&self.file)?;
        let depot = depot_name(&depot_path)
            .ok_or_else(|| anyhow!("Unexpected depot path: {depot_path}"))?;

        Ok(format!("perforce://{}/{}", server_host(address), depot))
    }
}

/// Parse `p4 -ztag` output into records.
///
/// Each field is a line `... <key> <value>`; records are separated by blank
/// lines. Lines without the `... ` prefix continue the previous value.
pub(crate) fn parse_ztag(output: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut current = Record::new();
    let mut last_key: Option<String> = None;

    for line in output.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            last_key = None;
            continue;
        }

        if let Some(field) = line.strip_prefix("... ") {
            let (key, value) = field.split_once(' ').unwrap_or((field, ""));
            current.insert(key.to_string(), value.to_string());
            last_key = Some(key.to_string());
        } else if let Some(key) = &last_key
            && let Some(value) = current.get_mut(key)
        {
            value.push('\n');
            value.push_str(line);
        }
    }

    if !current.is_empty() {
        records.push(current);
    }
    records
}

/// Host part of a `P4PORT`-style address.
///
/// Strips the transport prefix (`ssl:`, `tcp6:`, ...) and the port. A bare
/// port means the server runs locally.
pub(crate) fn server_host(address: &str) -> &str {
    let mut rest = address.trim();
    if let Some((prefix, remainder)) = rest.split_once(':')
        && is_transport_prefix(prefix)
    {
        rest = remainder;
    }
    match rest.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        None if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) => "localhost",
        _ => rest,
    }
}

fn is_transport_prefix(prefix: &str) -> bool {
    matches!(
        prefix,
        "tcp" | "tcp4" | "tcp6" | "tcp46" | "tcp64" | "ssl" | "ssl4" | "ssl6" | "ssl46" | "ssl64"
    )
}

/// First segment of a depot path: `//depot/src/a.go` -> `depot`.
pub(crate) fn depot_name(depot_path: &str) -> Option<&str> {
    depot_path
        .strip_prefix("//")?
        .split('/')
        .next()
        .filter(|name| !name.is_empty())
}

/// Whether a `p4` error message means the user must log in again.
pub(crate) fn is_authentication_failure(message: &str) -> bool {
    let message = message.to_lowercase();
    [
        "p4passwd",
        "password invalid",
        "session has expired",
        "please login again",
        "perforce password",
    ]
    .iter()
    .any(|needle| message.contains(needle))
}
