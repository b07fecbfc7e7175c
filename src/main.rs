use std::cell::Cell;
use std::path::Path;
use std::process;

use clap::Parser;
use color_print::cformat;
use repoinfo::config::{ProjectOverrides, UserConfig, set_config_path};
use repoinfo::path::format_path_for_display;
use repoinfo::styling::{eprintln, error_message, println};
use repoinfo::{NotificationSink, RepoInfo, Resolver, StderrNotifier};
use serde::Serialize;

mod cli;

use cli::Cli;

/// Forwards notifications and remembers whether any were sent.
struct TrackingNotifier<'a> {
    inner: &'a dyn NotificationSink,
    notified: Cell<bool>,
}

impl NotificationSink for TrackingNotifier<'_> {
    fn show(&self, message: &str) {
        self.notified.set(true);
        self.inner.show(message);
    }
}

#[derive(Serialize)]
struct Entry<'a> {
    file: String,
    #[serde(flatten)]
    info: &'a RepoInfo,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp(None);
    // RUST_LOG refines the level chosen by -v
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn print_field(key: &str, value: &str) {
    if value.is_empty() {
        println!("{}", cformat!("<bold>{key}:</>"));
    } else {
        println!("{}", cformat!("<bold>{key}:</> {value}"));
    }
}

fn print_text(file: &Path, info: &RepoInfo) {
    print_field("file", &format_path_for_display(file));
    print_field("vcs", info.vcs_type.into());
    print_field("remote-url", &info.remote_url);
    print_field("branch", &info.branch_name);
    print_field("relative-path", &info.relative_path);
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    if let Some(path) = cli.config {
        set_config_path(path);
    }

    let mut config = UserConfig::load()?;
    config.overrides = ProjectOverrides {
        default_branch: cli.default_branch,
        remote_url_replacements: cli.replacements,
    };
    config.validate()?;
    let resolver = Resolver::with_default_handlers(config);
    log::debug!("{resolver:?}");

    let sink = TrackingNotifier {
        inner: &StderrNotifier,
        notified: Cell::new(false),
    };
    let results: Vec<_> = cli
        .files
        .iter()
        .map(|file| (file, resolver.resolve_or_notify(file, &sink)))
        .collect();

    if cli.json {
        let entries: Vec<_> = results
            .iter()
            .map(|(file, info)| Entry {
                file: file.display().to_string(),
                info,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for (i, (file, info)) in results.iter().enumerate() {
            if i > 0 {
                println!();
            }
            print_text(file, info);
        }
    }

    Ok(sink.notified.get())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let strict = cli.strict;

    match run(cli) {
        Ok(any_failed) if strict && any_failed => process::exit(1),
        Ok(_) => {}
        Err(e) => {
            eprintln!("{}", error_message(format!("{e:#}")));
            process::exit(1);
        }
    }
}
