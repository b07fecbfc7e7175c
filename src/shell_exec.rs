//! Subprocess execution for VCS tools.
//!
//! Every external command (`git`, `p4`) goes through [`Cmd`], which logs the
//! command line before it runs and a trace line with the duration afterwards.
//! Run with `RUST_LOG=debug` (or `-vv`) to see them:
//!
//! ```text
//! $ git branch --show-current [widgets]
//! [repoinfo-trace] context=widgets cmd="git branch --show-current" dur=3.1ms ok=true
//! ```

use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::Instant;

/// Builder for a logged subprocess invocation.
#[derive(Debug)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
    dir: Option<PathBuf>,
    context: Option<String>,
    env: Vec<(String, String)>,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            dir: None,
            context: None,
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|a| a.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Short label shown next to the command in logs (usually a repository name).
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// The command line as it would be typed in a shell.
    pub fn display(&self) -> String {
        std::iter::once(Cow::Borrowed(self.program.as_str()))
            .chain(
                self.args
                    .iter()
                    .map(|a| shell_escape::escape(Cow::Borrowed(a.as_str()))),
            )
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the command to completion, capturing stdout and stderr.
    ///
    /// Only spawn failures are errors; a non-zero exit status is returned in
    /// the [`Output`] for the caller to interpret.
    pub fn run(self) -> std::io::Result<Output> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        run(&mut cmd, &self.display(), self.context.as_deref())
    }
}

fn run(cmd: &mut Command, cmd_str: &str, context: Option<&str>) -> std::io::Result<Output> {
    match context {
        Some(ctx) => log::debug!("$ {} [{}]", cmd_str, ctx),
        None => log::debug!("$ {}", cmd_str),
    }

    let t0 = Instant::now();
    let result = cmd.output();
    let duration_ms = t0.elapsed().as_secs_f64() * 1000.0;

    let prefix = match context {
        Some(ctx) => format!("[repoinfo-trace] context={ctx} "),
        None => "[repoinfo-trace] ".to_string(),
    };
    match &result {
        Ok(output) => log::debug!(
            "{}cmd=\"{}\" dur={:.1}ms ok={}",
            prefix,
            cmd_str,
            duration_ms,
            output.status.success()
        ),
        Err(e) => log::debug!(
            "{}cmd=\"{}\" dur={:.1}ms err=\"{}\"",
            prefix,
            cmd_str,
            duration_ms,
            e
        ),
    }

    result
}

/// Combine stderr and stdout of a failed command into one error message.
///
/// Some tools print their errors to stdout (`p4` does for several
/// conditions), so both streams are kept.
pub fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).replace('\r', "\n");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let message = [stderr.trim(), stdout.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if message.is_empty() {
        format!("exited with {}", output.status)
    } else {
        message
    }
}
