//! Encode command implementation

use std::io::Write;
use std::path::Path;

use kubegen_core::{Format, Scheme, encode_list};

use super::load_manifest;
use crate::config::Config;
use crate::error::Result;

/// Run the encode command
///
/// Writes every object of the manifest as one normalized `List` to `out`.
pub fn run_encode(
    config: &Config,
    manifest: &Path,
    format: Option<Format>,
    pretty: bool,
    out: &mut impl Write,
) -> Result<()> {
    let scheme = Scheme::new();
    let items = load_manifest(&scheme, manifest)?;

    let format = format.unwrap_or(config.output.format);
    let pretty = pretty || config.output.pretty;
    let data = encode_list(&scheme, &items, format.content_type(), pretty)?;

    out.write_all(&data)?;
    out.flush()?;
    Ok(())
}
