//! Run manifest export (JSON).
//!
//! Records what a run read and wrote. Each output carries a BLAKE3 digest of
//! its bytes, so two runs over the same data can be checked for identical
//! output from their manifests alone.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use adrank_core::RankingMetric;

use crate::reader::ReadStats;

pub const MANIFEST_FILE: &str = "run_manifest.json";

/// Current schema version for persisted manifests.
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to serialize run manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unsupported manifest schema version {found} (max supported: {max})")]
    UnsupportedSchema { found: u32, max: u32 },
}

/// One written leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputArtifact {
    pub metric: RankingMetric,
    pub path: PathBuf,
    pub rows: usize,
    pub blake3: String,
}

impl OutputArtifact {
    /// Describe a file already on disk.
    pub fn from_file(metric: RankingMetric, path: &Path, rows: usize) -> Result<Self, ManifestError> {
        let bytes = fs::read(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            metric,
            path: path.to_path_buf(),
            rows,
            blake3: blake3::hash(&bytes).to_hex().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub timestamp: DateTime<Utc>,
    pub input: PathBuf,
    pub top_k: usize,
    pub stats: ReadStats,
    pub distinct_campaigns: usize,
    pub elapsed_secs: f64,
    pub outputs: Vec<OutputArtifact>,
}

fn default_schema_version() -> u32 {
    MANIFEST_SCHEMA_VERSION
}

impl RunManifest {
    pub fn output(&self, metric: RankingMetric) -> Option<&OutputArtifact> {
        self.outputs.iter().find(|o| o.metric == metric)
    }
}

pub fn write_manifest(path: &Path, manifest: &RunManifest) -> Result<(), ManifestError> {
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(path, json).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a manifest, rejecting schema versions newer than this build knows.
pub fn read_manifest(path: &Path) -> Result<RunManifest, ManifestError> {
    let json = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let manifest: RunManifest = serde_json::from_str(&json)?;
    if manifest.schema_version > MANIFEST_SCHEMA_VERSION {
        return Err(ManifestError::UnsupportedSchema {
            found: manifest.schema_version,
            max: MANIFEST_SCHEMA_VERSION,
        });
    }
    Ok(manifest)
}
