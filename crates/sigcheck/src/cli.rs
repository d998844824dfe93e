use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use serde::Serialize;

/// Verify files against a checksum manifest, hashing them concurrently.
#[derive(Clone, Debug, Parser)]
#[command(name = "sigcheck", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Directory holding the files listed in the manifest
    #[arg(value_name = "ROOT")]
    pub root: Option<PathBuf>,

    /// Manifest file (default: <ROOT>/sha256sum.txt)
    #[arg(short, long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Suffix appended to every manifest name to find the file on disk
    #[arg(short, long)]
    pub suffix: Option<String>,

    /// Compression of the stored files: none, gzip, bzip2, xz, zstd
    #[arg(short, long)]
    pub compression: Option<String>,

    /// Digest algorithm: sha256, sha512, sha1, blake3
    #[arg(short, long)]
    pub algorithm: Option<String>,

    /// Maximum number of files hashed at the same time
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Stop starting new files after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Reject manifests that list the same file twice
    #[arg(long)]
    pub strict: bool,

    /// Configuration file (default: ./sigcheck.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print every file, not only failures. Repeat for debug logs.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Command-line values that override the configuration file and environment.
/// Unset flags are omitted so they do not mask lower layers.
#[derive(Debug, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root:        Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest:    Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix:      Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm:   Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs:        Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_fast:   Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict:      Option<bool>,
}

impl From<&Cli> for Overrides {
    fn from(cli: &Cli) -> Self {
        Self {
            root:        cli.root.clone(),
            manifest:    cli.manifest.clone(),
            suffix:      cli.suffix.clone(),
            compression: cli.compression.clone(),
            algorithm:   cli.algorithm.clone(),
            jobs:        cli.jobs,
            fail_fast:   cli.fail_fast.then_some(true),
            strict:      cli.strict.then_some(true),
        }
    }
}
