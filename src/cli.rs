use std::path::PathBuf;

use clap::Parser;
use clap::builder::styling::{AnsiColor, Color, Style, Styles};

/// Custom styles for help output
fn help_styles() -> Styles {
    Styles::styled()
        .header(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .usage(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .literal(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
        .error(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
}

/// Show the VCS, remote URL, branch, and repository-relative path of files
#[derive(Parser, Debug)]
#[command(name = "repoinfo", version, styles = help_styles())]
#[command(after_long_help = "\
Configuration is read from ~/.config/repoinfo/config.toml (override with \
--config or REPOINFO_CONFIG_PATH). Flags take precedence over the file.")]
pub struct Cli {
    /// Files to resolve
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Branch to report when the local branch is not on the remote
    #[arg(long, value_name = "NAME")]
    pub default_branch: Option<String>,

    /// Comma-separated find/replace pairs applied to remote URLs
    #[arg(long, value_name = "PAIRS")]
    pub replacements: Option<String>,

    /// User config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Exit with status 1 if any file could not be fully resolved
    #[arg(long)]
    pub strict: bool,

    /// Show debug output (-v for info, -vv for debug with command traces)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
