//! Split command implementation
//!
//! Writes one file per object of a manifest.

use std::path::Path;

use colored::Colorize;
use kubegen_core::{Format, Partitioner, Scheme};

use super::{load_manifest, partition_options};
use crate::config::Config;
use crate::error::{CliError, Result};

/// Run the split command
///
/// Returns the names of the files written, in manifest order. Objects that
/// get no file (unknown kind, unusable or repeated name) are reported and
/// make the command fail after the other files have been written.
pub fn run_split(
    cwd: &Path,
    config: &Config,
    manifest: &Path,
    format: Option<Format>,
    out_dir: Option<&Path>,
    legacy_extension: bool,
) -> Result<Vec<String>> {
    let scheme = Scheme::new();
    let items = load_manifest(&scheme, &cwd.join(manifest))?;

    let format = format.unwrap_or(config.output.format);
    let dir = cwd.join(out_dir.unwrap_or(&config.output.directory));
    let options = partition_options(config, legacy_extension);

    let report = Partitioner::with_options(&scheme, options).dump_to_files(
        &items,
        format.content_type(),
        &dir,
    )?;

    for filename in &report.written {
        println!("{} {}", "wrote".green().bold(), filename);
    }
    for rejected in &report.rejected {
        eprintln!(
            "{} object #{}: {}",
            "skipped".yellow().bold(),
            rejected.index,
            rejected.error
        );
    }

    if !report.rejected.is_empty() {
        return Err(CliError::user(format!(
            "{} object(s) were not written",
            report.rejected.len()
        )));
    }
    Ok(report.written)
}
