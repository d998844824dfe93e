//! Layered configuration.
//!
//! Precedence, lowest first: built-in defaults, `sigcheck.toml` (or the file
//! given with `--config`), `SIGCHECK_*` environment variables, command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use sigcheck_batch::{BatchOptions, ManifestOptions, StorageLayout};
use sigcheck_codec::Compression;
use sigcheck_verify::DigestAlgorithm;

use crate::cli::{Cli, Overrides};

pub const DEFAULT_CONFIG: &str = "sigcheck.toml";
pub const DEFAULT_MANIFEST: &str = "sha256sum.txt";
pub const ENV_PREFIX: &str = "SIGCHECK_";

/// Configuration as written by the user, before validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawConfig {
    pub root:        PathBuf,
    pub manifest:    Option<PathBuf>,
    pub suffix:      Option<String>,
    pub compression: Option<String>,
    pub algorithm:   String,
    pub jobs:        usize,
    pub fail_fast:   bool,
    pub strict:      bool,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            root:        PathBuf::from("."),
            manifest:    None,
            suffix:      None,
            compression: None,
            algorithm:   DigestAlgorithm::Sha256.to_string(),
            jobs:        BatchOptions::default().jobs,
            fail_fast:   false,
            strict:      false,
        }
    }
}

/// Validated settings for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub manifest:         PathBuf,
    pub manifest_options: ManifestOptions,
    pub layout:           StorageLayout,
    pub algorithm:        DigestAlgorithm,
    pub batch:            BatchOptions,
}

pub fn figment(cli: &Cli) -> Figment {
    let file = cli.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    Figment::from(Serialized::defaults(RawConfig::default()))
        .merge(Toml::file_exact(file))
        .merge(Env::prefixed(ENV_PREFIX))
        .merge(Serialized::defaults(Overrides::from(cli)))
}

pub fn load(cli: &Cli) -> Result<Settings> {
    if let Some(path) = &cli.config {
        if !path.is_file() {
            bail!("config file not found: {}", path.display());
        }
    }

    let raw: RawConfig = figment(cli).extract().context("invalid configuration")?;
    raw.resolve()
}

impl RawConfig {
    pub fn resolve(self) -> Result<Settings> {
        let (compression, suffix) = codec_and_suffix(self.compression.as_deref(), self.suffix)?;
        if !compression.is_supported() {
            bail!("{compression} support is not compiled into this build");
        }

        let algorithm: DigestAlgorithm = self
            .algorithm
            .parse()
            .with_context(|| format!("invalid algorithm '{}'", self.algorithm))?;

        if self.jobs == 0 {
            bail!("jobs must be at least 1");
        }

        let manifest = self
            .manifest
            .unwrap_or_else(|| default_manifest(&self.root));

        Ok(Settings {
            manifest,
            manifest_options: ManifestOptions::default().strict(self.strict),
            layout: StorageLayout::new(self.root)
                .suffix(suffix)
                .compression(compression),
            algorithm,
            batch: BatchOptions::default()
                .jobs(self.jobs)
                .fail_fast(self.fail_fast),
        })
    }
}

fn default_manifest(root: &Path) -> PathBuf { root.join(DEFAULT_MANIFEST) }

/// Either one implies the other; with neither, files are bzip2 with a `.bz2` suffix.
fn codec_and_suffix(compression: Option<&str>, suffix: Option<String>) -> Result<(Compression, String)> {
    let parsed = compression
        .map(|name| {
            name.parse::<Compression>()
                .with_context(|| format!("invalid compression '{name}'"))
        })
        .transpose()?;

    Ok(match (parsed, suffix) {
        (Some(codec), Some(suffix)) => (codec, suffix),
        (Some(codec), None) => (codec, codec.suffix().to_string()),
        (None, Some(suffix)) => (Compression::from_suffix(&suffix), suffix),
        (None, None) => (Compression::Bzip2, Compression::Bzip2.suffix().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults_resolve_to_bzip2_sha256() {
        let settings = RawConfig::default().resolve().unwrap();

        assert_eq!(settings.manifest, PathBuf::from("./sha256sum.txt"));
        assert_eq!(settings.layout.compression, Compression::Bzip2);
        assert_eq!(settings.layout.suffix, ".bz2");
        assert_eq!(settings.algorithm, DigestAlgorithm::Sha256);
        assert_eq!(settings.batch.jobs, 5);
        assert!(!settings.manifest_options.strict);
    }

    #[test]
    fn suffix_implies_codec() {
        let raw = RawConfig {
            suffix: Some(".gz".into()),
            ..RawConfig::default()
        };
        let settings = raw.resolve().unwrap();
        assert_eq!(settings.layout.compression, Compression::Gzip);
    }

    #[test]
    fn codec_implies_suffix() {
        let raw = RawConfig {
            compression: Some("none".into()),
            ..RawConfig::default()
        };
        let settings = raw.resolve().unwrap();
        assert_eq!(settings.layout.compression, Compression::None);
        assert_eq!(settings.layout.suffix, "");
    }

    #[test]
    fn zero_jobs_rejected() {
        let raw = RawConfig {
            jobs: 0,
            ..RawConfig::default()
        };
        assert!(raw.resolve().is_err());
    }

    #[test]
    fn unknown_algorithm_rejected() {
        let raw = RawConfig {
            algorithm: "md5".into(),
            ..RawConfig::default()
        };
        let err = raw.resolve().unwrap_err();
        assert!(format!("{err:#}").contains("md5"));
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sigcheck.toml");
        std::fs::write(&path, "jobs = 9\nsuffix = \".gz\"\nroot = \"/srv/taxi\"\n").unwrap();

        let cli = Cli::parse_from([
            "sigcheck",
            "--config",
            path.to_str().unwrap(),
            "--jobs",
            "2",
        ]);
        let settings = load(&cli).unwrap();

        assert_eq!(settings.batch.jobs, 2);
        assert_eq!(settings.layout.suffix, ".gz");
        assert_eq!(settings.layout.compression, Compression::Gzip);
        assert_eq!(settings.manifest, PathBuf::from("/srv/taxi/sha256sum.txt"));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let cli = Cli::parse_from(["sigcheck", "--config", "/no/such/sigcheck.toml"]);
        assert!(load(&cli).is_err());
    }
}
