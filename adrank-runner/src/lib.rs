//! adrank runner — file-level orchestration around `adrank-core`.
//!
//! This crate provides:
//! - Run configuration from TOML and/or flags, validated into a `RunPlan`
//! - A streaming CSV reader that resolves columns by header name
//! - The ranking pipeline (read → aggregate → select → export)
//! - CSV export of both leaderboards
//! - An optional JSON run manifest with output digests

pub mod config;
pub mod export;
pub mod manifest;
pub mod pipeline;
pub mod reader;

pub use config::{ConfigError, RunConfig, RunPlan};
pub use export::{export_rankings_csv, save_rankings, write_rankings_csv, ExportError};
pub use manifest::{read_manifest, ManifestError, OutputArtifact, RunManifest, MANIFEST_FILE};
pub use pipeline::{aggregate_csv, rank_csv, run, run_plan, RunError, RunReport};
pub use reader::{CampaignReader, ColumnIndex, ReadError, ReadStats, REQUIRED_COLUMNS};
