//! kubegen CLI
//!
//! Encodes Kubernetes manifests into normalized, reviewable files.

mod cli;
mod commands;
mod config;
mod error;

use std::io;
use std::path::Path;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use cli::{Cli, Commands};
use config::Config;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(cmd) => {
            let cwd = std::env::current_dir()?;
            let config = Config::load(cli.config.as_deref(), &cwd)?;
            execute_command(&cwd, &config, cmd)
        }
        None => {
            println!("{} Kubernetes manifest generator", "kubegen".green().bold());
            println!();
            println!("Run {} for available commands.", "kubegen --help".cyan());
            Ok(())
        }
    }
}

/// Logs go to stderr so encoded output on stdout stays clean.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(verbose),
        )
        .try_init();
    tracing::debug!("verbose mode enabled");
}

fn execute_command(cwd: &Path, config: &Config, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Encode {
            manifest,
            format,
            pretty,
        } => {
            let mut stdout = io::stdout().lock();
            commands::run_encode(
                config,
                &cwd.join(manifest),
                format.map(Into::into),
                pretty,
                &mut stdout,
            )
        }
        Commands::Split {
            manifest,
            format,
            out_dir,
            legacy_extension,
        } => commands::run_split(
            cwd,
            config,
            &manifest,
            format.map(Into::into),
            out_dir.as_deref(),
            legacy_extension,
        )
        .map(|_| ()),
        Commands::Check {
            manifest,
            format,
            out_dir,
            legacy_extension,
        } => commands::run_check(
            cwd,
            config,
            &manifest,
            format.map(Into::into),
            out_dir.as_deref(),
            legacy_extension,
        ),
    }
}
