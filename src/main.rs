use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use tracing::subscriber::set_global_default as set_global_subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use release_kit::cli::{self, ReleaseArgs};
use release_kit::config::{self, Config};
use release_kit::git::Git2Repository;
use release_kit::version::{tool_version, BumpLevel};
use release_kit::{gate, revision, ui};

#[derive(Parser)]
#[command(
    name = "release-kit",
    about = "Bump, commit, tag and push workspace releases",
    disable_version_flag = true
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase log verbosity (-v, -vv, -vvv)")]
    verbose: u8,

    #[arg(short = 'V', long, help = "Print version information")]
    version: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Bump the manifest version, commit, tag and push the release
    Release {
        /// Version component to increment (defaults to release.default_level)
        #[arg(value_enum)]
        level: Option<BumpLevel>,

        #[arg(long, help = "Manifest to bump (defaults to release.manifest)")]
        manifest: Option<PathBuf>,

        #[arg(long, help = "Remote to push to (defaults to release.remote)")]
        remote: Option<String>,

        #[arg(long, help = "Create the commit and tag without pushing")]
        no_push: bool,

        #[arg(long, help = "Run the pre-commit checks before releasing")]
        check: bool,

        #[arg(long, help = "Preview what would happen without making changes")]
        dry_run: bool,
    },
    /// Print the build revision of the current checkout
    Revision,
    /// Run format, lint and test checks, then the commit steps
    Check {
        #[arg(long, help = "Only run the checks")]
        skip_commit: bool,
    },
    /// Run the build command with the revision exported
    Build,
}

/// Filter directives for the subscriber; a non-empty `RUST_LOG` wins over `-v`.
fn log_directives(verbosity: u8, rust_log: Option<String>) -> String {
    match rust_log {
        Some(directives) if !directives.trim().is_empty() => directives,
        _ => {
            let level = match verbosity {
                0 => LevelFilter::WARN,
                1 => LevelFilter::INFO,
                2 => LevelFilter::DEBUG,
                _ => LevelFilter::TRACE,
            };
            level.to_string().to_lowercase()
        }
    }
}

fn init_logging(verbosity: u8) -> Result<()> {
    let directives = log_directives(verbosity, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("invalid log filter '{}'", directives))?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    set_global_subscriber(subscriber).context("failed to set tracing subscriber")
}

fn run() -> Result<()> {
    let args = Args::parse();

    if args.version {
        println!("release-kit {}", tool_version());
        return Ok(());
    }

    let command = match args.command {
        Some(command) => command,
        None => {
            Args::command().print_help()?;
            return Ok(());
        }
    };

    init_logging(args.verbose)?;

    let config: Config =
        config::load_config(args.config.as_deref()).context("failed to load configuration")?;

    match command {
        Command::Release {
            level,
            manifest,
            remote,
            no_push,
            check,
            dry_run,
        } => {
            let repo = Git2Repository::open(".")?;
            let release_args = ReleaseArgs {
                level: level.unwrap_or(config.release.default_level),
                manifest_path: manifest.unwrap_or_else(|| PathBuf::from(&config.release.manifest)),
                remote,
                no_push,
                dry_run,
                run_checks: check,
            };

            let result = cli::run_release_workflow(&repo, &release_args, &config)?;
            if !dry_run && !result.tag_pushed {
                let remote = release_args.remote.as_deref().unwrap_or(&config.release.remote);
                ui::display_manual_push_instruction(&result.tag, remote);
            }
            println!("VERSION: {}", result.version);
        }
        Command::Revision => {
            let repo = Git2Repository::open(".")?;
            println!("{}", revision::compose(&repo)?);
        }
        Command::Check { skip_commit } => {
            gate::run_precommit(&config.precommit, skip_commit)?;
            ui::display_success("All gate steps passed");
        }
        Command::Build => {
            let repo = Git2Repository::open(".")?;
            let revision = cli::run_build_workflow(&repo, &config.build)?;
            ui::display_success(&format!("Built revision {}", revision));
        }
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_sets_level() {
        assert_eq!(log_directives(0, None), "warn");
        assert_eq!(log_directives(1, None), "info");
        assert_eq!(log_directives(2, None), "debug");
        assert_eq!(log_directives(5, None), "trace");
    }

    #[test]
    fn test_rust_log_overrides_verbosity() {
        assert_eq!(
            log_directives(0, Some("release_kit=debug".to_string())),
            "release_kit=debug"
        );
        assert_eq!(log_directives(1, Some("  ".to_string())), "info");
        assert!(EnvFilter::try_new(log_directives(3, None)).is_ok());
    }
}
