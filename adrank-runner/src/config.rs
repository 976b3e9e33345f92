//! Run configuration.
//!
//! A `RunConfig` can be loaded from TOML, built from command-line flags, or
//! both (flags override the file). `resolve()` validates it into a `RunPlan`
//! carrying concrete paths and a typed K; nothing downstream sees an
//! unvalidated configuration.
//!
//! ```toml
//! input = "data/ad_data.csv"
//! output_dir = "results"
//! top_k = 10
//! ctr_file = "top10_ctr.csv"
//! cpa_file = "top10_cpa.csv"
//! write_manifest = true
//! ```

use std::ffi::OsStr;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::manifest::MANIFEST_FILE;

pub const DEFAULT_TOP_K: i64 = 10;
pub const DEFAULT_CTR_FILE: &str = "top10_ctr.csv";
pub const DEFAULT_CPA_FILE: &str = "top10_cpa.csv";

/// Configuration errors. All are fatal and raised before any input is read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required input path (--input)")]
    MissingInput,

    #[error("missing required output directory (--output)")]
    MissingOutput,

    #[error("--top-k must be > 0 (got {0})")]
    NonPositiveTopK(i64),

    #[error("invalid output file name {0:?}: expected a plain file name")]
    InvalidFileName(String),

    #[error("CTR and CPA outputs cannot share the file name {0:?}")]
    SameOutputFile(String),

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// User-facing run configuration, as written in a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Input CSV file.
    pub input: Option<PathBuf>,
    /// Directory receiving both ranking files (created if absent).
    pub output_dir: Option<PathBuf>,
    /// Leaderboard size. Signed so that non-positive values fail validation
    /// with a clear message instead of a parse error.
    pub top_k: i64,
    /// File name of the CTR leaderboard inside `output_dir`.
    pub ctr_file: String,
    /// File name of the CPA leaderboard inside `output_dir`.
    pub cpa_file: String,
    /// Also write `run_manifest.json` next to the leaderboards.
    pub write_manifest: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: None,
            output_dir: None,
            top_k: DEFAULT_TOP_K,
            ctr_file: DEFAULT_CTR_FILE.to_string(),
            cpa_file: DEFAULT_CPA_FILE.to_string(),
            write_manifest: false,
        }
    }
}

impl RunConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validated leaderboard size.
    pub fn validated_top_k(&self) -> Result<NonZeroUsize, ConfigError> {
        usize::try_from(self.top_k)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or(ConfigError::NonPositiveTopK(self.top_k))
    }

    /// Validate and turn into a concrete plan.
    pub fn resolve(&self) -> Result<RunPlan, ConfigError> {
        let input = self.input.clone().ok_or(ConfigError::MissingInput)?;
        let output_dir = self.output_dir.clone().ok_or(ConfigError::MissingOutput)?;
        let top_k = self.validated_top_k()?;

        check_file_name(&self.ctr_file)?;
        check_file_name(&self.cpa_file)?;
        if self.ctr_file == self.cpa_file {
            return Err(ConfigError::SameOutputFile(self.ctr_file.clone()));
        }
        if self.write_manifest && (self.ctr_file == MANIFEST_FILE || self.cpa_file == MANIFEST_FILE) {
            return Err(ConfigError::SameOutputFile(MANIFEST_FILE.to_string()));
        }

        Ok(RunPlan {
            ctr_path: output_dir.join(&self.ctr_file),
            cpa_path: output_dir.join(&self.cpa_file),
            manifest_path: self.write_manifest.then(|| output_dir.join(MANIFEST_FILE)),
            input,
            output_dir,
            top_k,
        })
    }
}

fn check_file_name(name: &str) -> Result<(), ConfigError> {
    if Path::new(name).file_name() == Some(OsStr::new(name)) {
        Ok(())
    } else {
        Err(ConfigError::InvalidFileName(name.to_string()))
    }
}

/// A validated configuration with every path resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub top_k: NonZeroUsize,
    pub ctr_path: PathBuf,
    pub cpa_path: PathBuf,
    pub manifest_path: Option<PathBuf>,
}
