//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use kubegen_core::Format;

/// kubegen - Generate reviewable Kubernetes manifests
#[derive(Parser, Debug)]
#[command(name = "kubegen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ./kubegen.toml when present)
    #[arg(long, global = true, env = "KUBEGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Encode a manifest as one normalized List and print it
    Encode {
        /// Input manifest (.yaml, .yml or .json)
        manifest: PathBuf,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Pretty-print output where the format supports it
        #[arg(long)]
        pretty: bool,
    },

    /// Write one file per object
    ///
    /// Files are named <name>-<suffix>.<ext>, where the suffix depends on
    /// the kind (svc, dpl, rs, ds, ss).
    Split {
        /// Input manifest (.yaml, .yml or .json)
        manifest: PathBuf,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Directory to write files into
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Always use the .yaml extension, even for JSON output
        #[arg(long)]
        legacy_extension: bool,
    },

    /// Check that files written by `split` are up to date
    Check {
        /// Input manifest (.yaml, .yml or .json)
        manifest: PathBuf,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Directory holding the generated files
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Expect the .yaml extension, as written by `split --legacy-extension`
        #[arg(long)]
        legacy_extension: bool,
    },
}

/// Output formats selectable on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Yaml,
    Json,
}

impl From<FormatArg> for Format {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Yaml => Format::Yaml,
            FormatArg::Json => Format::Json,
        }
    }
}
