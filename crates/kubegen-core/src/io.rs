//! Atomic artifact writes with file locking

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use fs2::FileExt;

use crate::{Error, Result};

/// Permissions given to written artifacts: owner read/write, others read.
pub const ARTIFACT_MODE: u32 = 0o644;

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so a reader never sees a partial file.
/// The file ends up with [`ARTIFACT_MODE`] permissions on Unix.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::write(path, e))?;
    }

    // Temp file in the same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let result = write_temp(&temp_path, content).and_then(|()| fs::rename(&temp_path, path));
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result.map_err(|e| Error::write(path, e))
}

fn write_temp(temp_path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)?;

    file.lock_exclusive()?;
    file.write_all(content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(ARTIFACT_MODE))?;
    }

    file.sync_all()?;
    FileExt::unlock(&file)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_parent_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("api-svc.yaml");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_sets_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("api-dpl.yaml");
        write_atomic(&path, b"kind: Deployment\n").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, ARTIFACT_MODE);
    }

    #[test]
    fn test_write_atomic_reports_path() {
        let dir = TempDir::new().unwrap();
        // a directory cannot be replaced by a file
        let path = dir.path().join("taken");
        fs::create_dir(&path).unwrap();

        let err = write_atomic(&path, b"data").unwrap_err();
        match err {
            Error::Write { filename, .. } => assert_eq!(filename, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
