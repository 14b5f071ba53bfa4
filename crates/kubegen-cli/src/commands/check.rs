//! Check command implementation
//!
//! Regenerates the files `split` would write and compares them with the
//! ones on disk.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use colored::Colorize;
use kubegen_core::{Format, Partitioner, Scheme};
use similar::TextDiff;

use super::{load_manifest, partition_options};
use crate::config::Config;
use crate::error::{CliError, Result};

/// State of one generated file relative to the disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    UpToDate,
    Missing,
    /// Unified diff from the file on disk to the generated content.
    Drifted(String),
}

/// Run the check command
///
/// Fails if any file is missing or differs, printing a diff for each
/// changed file.
pub fn run_check(
    cwd: &Path,
    config: &Config,
    manifest: &Path,
    format: Option<Format>,
    out_dir: Option<&Path>,
    legacy_extension: bool,
) -> Result<()> {
    let scheme = Scheme::new();
    let items = load_manifest(&scheme, &cwd.join(manifest))?;

    let format = format.unwrap_or(config.output.format);
    let dir = cwd.join(out_dir.unwrap_or(&config.output.directory));
    let options = partition_options(config, legacy_extension);
    let partition =
        Partitioner::with_options(&scheme, options).partition(&items, format.content_type())?;

    let mut stale = 0;
    for artifact in &partition.artifacts {
        let expected = String::from_utf8_lossy(&artifact.content);
        match compare(&dir.join(&artifact.filename), &artifact.filename, &expected)? {
            FileStatus::UpToDate => {}
            FileStatus::Missing => {
                stale += 1;
                println!("{} {}", "missing".red().bold(), artifact.filename);
            }
            FileStatus::Drifted(diff) => {
                stale += 1;
                println!("{} {}", "changed".yellow().bold(), artifact.filename);
                print!("{diff}");
            }
        }
    }
    for rejected in &partition.rejected {
        eprintln!(
            "{} object #{}: {}",
            "skipped".yellow().bold(),
            rejected.index,
            rejected.error
        );
    }

    if stale > 0 {
        return Err(CliError::user(format!("{stale} file(s) out of date")));
    }
    println!(
        "{} {} file(s) up to date",
        "OK".green().bold(),
        partition.artifacts.len()
    );
    Ok(())
}

/// Compare a file on disk with the content it should have.
pub fn compare(path: &Path, filename: &str, expected: &str) -> Result<FileStatus> {
    let current = match fs::read_to_string(path) {
        Ok(current) => current,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(FileStatus::Missing),
        Err(e) => return Err(CliError::read(path, e)),
    };

    if current == expected {
        return Ok(FileStatus::UpToDate);
    }

    let old_header = format!("{filename} (on disk)");
    let new_header = format!("{filename} (generated)");
    let diff = TextDiff::from_lines(current.as_str(), expected);
    let mut unified = diff.unified_diff();
    unified.context_radius(3).header(&old_header, &new_header);
    Ok(FileStatus::Drifted(unified.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_compare_states() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("api-svc.yaml");

        assert_eq!(compare(&path, "api-svc.yaml", "a: 1\n").unwrap(), FileStatus::Missing);

        fs::write(&path, "a: 1\n").unwrap();
        assert_eq!(compare(&path, "api-svc.yaml", "a: 1\n").unwrap(), FileStatus::UpToDate);

        let FileStatus::Drifted(diff) = compare(&path, "api-svc.yaml", "a: 2\n").unwrap() else {
            panic!("expected drift");
        };
        assert!(diff.contains("--- api-svc.yaml (on disk)"));
        assert!(diff.contains("+++ api-svc.yaml (generated)"));
        assert!(diff.contains("-a: 1"));
        assert!(diff.contains("+a: 2"));
    }
}
