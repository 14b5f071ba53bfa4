//! Command implementations for kubegen-cli

pub mod check;
pub mod encode;
pub mod split;

use std::fs;
use std::path::Path;

use kubegen_core::{ExtensionPolicy, Format, Object, PartitionOptions, Scheme, decode_list};
use tracing::debug;

use crate::config::Config;
use crate::error::{CliError, Result};

pub use check::run_check;
pub use encode::run_encode;
pub use split::run_split;

/// Read a manifest holding a `List` or a single object. The input format
/// comes from the file extension.
pub(crate) fn load_manifest(scheme: &Scheme, path: &Path) -> Result<Vec<Object>> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    let format = Format::from_extension(extension).ok_or_else(|| {
        CliError::user(format!(
            "cannot tell the format of {} from its extension (expected .yaml, .yml or .json)",
            path.display()
        ))
    })?;

    let data = fs::read(path).map_err(|e| CliError::read(path, e))?;
    let items = decode_list(scheme, &data, format.content_type())?;
    debug!(path = %path.display(), items = items.len(), "loaded manifest");
    Ok(items)
}

/// Partition options from the config, with `--legacy-extension` taking
/// precedence.
pub(crate) fn partition_options(config: &Config, legacy_extension: bool) -> PartitionOptions {
    PartitionOptions {
        extension: if legacy_extension {
            ExtensionPolicy::AlwaysStructured
        } else {
            config.output.extension
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_manifest_by_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.yml");
        fs::write(
            &path,
            "apiVersion: v1\nkind: Service\nmetadata:\n  name: api\n",
        )
        .unwrap();

        let items = load_manifest(&Scheme::new(), &path).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name(), "api");
    }

    #[test]
    fn test_legacy_flag_overrides_config() {
        let config = Config::default();
        assert_eq!(partition_options(&config, false).extension, ExtensionPolicy::ByContentType);
        assert_eq!(partition_options(&config, true).extension, ExtensionPolicy::AlwaysStructured);
    }

    #[test]
    fn test_load_manifest_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.hcl");
        fs::write(&path, "service \"api\" {}").unwrap();

        let err = load_manifest(&Scheme::new(), &path).unwrap_err();
        assert!(matches!(err, CliError::User { .. }));
    }
}
