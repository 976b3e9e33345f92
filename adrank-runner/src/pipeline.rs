//! Ranking pipeline — wires reader, aggregator, selectors and export.
//!
//! Three entry points:
//! - `run()`: full file-to-file run from a `RunConfig`. Used by the CLI.
//! - `aggregate_csv()`: aggregate any CSV source in memory.
//! - `rank_csv()`: aggregate and rank any CSV source, no files written.

use std::fs;
use std::io::Read;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Utc;
use thiserror::Error;
use tracing::info;

use adrank_core::{rank_campaigns, Aggregator, RankingMetric, Rankings};

use crate::config::{ConfigError, RunConfig, RunPlan};
use crate::export::{save_rankings, ExportError};
use crate::manifest::{
    write_manifest, ManifestError, OutputArtifact, RunManifest, MANIFEST_SCHEMA_VERSION,
};
use crate::reader::{CampaignReader, ReadError, ReadStats};

/// Errors from a run. Every variant is fatal.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("aggregation failed: {0}")]
    Read(#[from] ReadError),

    #[error("failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {metric} output: {source}")]
    Export {
        metric: &'static str,
        source: ExportError,
    },

    #[error("failed to write run manifest: {0}")]
    Manifest(#[from] ManifestError),
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub stats: ReadStats,
    pub distinct_campaigns: usize,
    pub ctr_path: PathBuf,
    pub cpa_path: PathBuf,
    pub ctr_rows: usize,
    pub cpa_rows: usize,
    pub manifest_path: Option<PathBuf>,
    pub elapsed: Duration,
}

/// Aggregate every row of a CSV source.
pub fn aggregate_csv<R: Read>(source: R) -> Result<(Aggregator, ReadStats), ReadError> {
    let mut agg = Aggregator::new();
    let stats = CampaignReader::from_reader(source)?.aggregate_into(&mut agg)?;
    Ok((agg, stats))
}

/// Aggregate a CSV source and rank it under both metrics.
pub fn rank_csv<R: Read>(source: R, k: NonZeroUsize) -> Result<(Rankings, ReadStats), ReadError> {
    let (agg, stats) = aggregate_csv(source)?;
    Ok((rank_campaigns(&agg, k), stats))
}

/// Validate `config` and execute the resulting plan.
pub fn run(config: &RunConfig) -> Result<RunReport, RunError> {
    let plan = config.resolve()?;
    run_plan(&plan)
}

/// Execute a validated plan: read input, rank, write both leaderboards and,
/// if configured, the manifest.
pub fn run_plan(plan: &RunPlan) -> Result<RunReport, RunError> {
    let start = Instant::now();

    info!(input = %plan.input.display(), top_k = plan.top_k.get(), "reading campaign records");
    let mut agg = Aggregator::new();
    let stats = CampaignReader::open(&plan.input)?.aggregate_into(&mut agg)?;
    info!(
        total_rows = stats.total_rows,
        processed_rows = stats.processed_rows,
        skipped_rows = stats.skipped_rows,
        distinct_campaigns = agg.distinct_count(),
        "aggregation complete"
    );

    fs::create_dir_all(&plan.output_dir).map_err(|source| RunError::OutputDir {
        path: plan.output_dir.clone(),
        source,
    })?;

    let rankings = rank_campaigns(&agg, plan.top_k);
    info!(
        ctr_rows = rankings.ctr.len(),
        cpa_rows = rankings.cpa.len(),
        cpa_eligible = rankings.cpa_eligible,
        "selection complete"
    );

    for (metric, path) in [
        (RankingMetric::Ctr, &plan.ctr_path),
        (RankingMetric::Cpa, &plan.cpa_path),
    ] {
        save_rankings(path, rankings.get(metric)).map_err(|source| RunError::Export {
            metric: metric.name(),
            source,
        })?;
        info!(metric = metric.name(), path = %path.display(), "leaderboard written");
    }

    let elapsed = start.elapsed();

    if let Some(manifest_path) = &plan.manifest_path {
        let manifest = RunManifest {
            schema_version: MANIFEST_SCHEMA_VERSION,
            timestamp: Utc::now(),
            input: plan.input.clone(),
            top_k: plan.top_k.get(),
            stats,
            distinct_campaigns: agg.distinct_count(),
            elapsed_secs: elapsed.as_secs_f64(),
            outputs: vec![
                OutputArtifact::from_file(RankingMetric::Ctr, &plan.ctr_path, rankings.ctr.len())?,
                OutputArtifact::from_file(RankingMetric::Cpa, &plan.cpa_path, rankings.cpa.len())?,
            ],
        };
        write_manifest(manifest_path, &manifest)?;
        info!(path = %manifest_path.display(), "run manifest written");
    }

    Ok(RunReport {
        stats,
        distinct_campaigns: agg.distinct_count(),
        ctr_rows: rankings.ctr.len(),
        cpa_rows: rankings.cpa.len(),
        ctr_path: plan.ctr_path.clone(),
        cpa_path: plan.cpa_path.clone(),
        manifest_path: plan.manifest_path.clone(),
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn rank_csv_in_memory() {
        let input = "campaign_id,impressions,clicks,spend,conversions\n\
                     A,100,10,5.00,2\n\
                     A,50,5,2.50,1\n\
                     B,200,50,10.00,0\n";
        let (rankings, stats) = rank_csv(input.as_bytes(), k(2)).unwrap();
        assert_eq!(stats.processed_rows, 3);
        let ctr: Vec<&str> = rankings.ctr.iter().map(|m| m.campaign_id.as_str()).collect();
        assert_eq!(ctr, vec!["B", "A"]);
        assert_eq!(rankings.cpa.len(), 1);
    }

    #[test]
    fn invalid_config_fails_before_reading() {
        let config = RunConfig {
            input: Some("/definitely/not/here.csv".into()),
            output_dir: Some("/definitely/not/here".into()),
            top_k: 0,
            ..Default::default()
        };
        assert!(matches!(run(&config), Err(RunError::Config(ConfigError::NonPositiveTopK(0)))));
    }

    #[test]
    fn missing_input_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig {
            input: Some(dir.path().join("missing.csv")),
            output_dir: Some(dir.path().join("out")),
            ..Default::default()
        };
        assert!(matches!(run(&config), Err(RunError::Read(ReadError::Open { .. }))));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn run_plan_executes_a_resolved_plan() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        fs::write(
            &input,
            "campaign_id,impressions,clicks,spend,conversions\n\
             A,100,10,5.00,2\n\
             B,200,50,10.00,0\n",
        )
        .unwrap();
        let config = RunConfig {
            input: Some(input),
            output_dir: Some(dir.path().join("out")),
            top_k: 5,
            ..Default::default()
        };
        let plan = config.resolve().unwrap();

        let report = run_plan(&plan).unwrap();
        assert_eq!(report.stats.processed_rows, 2);
        assert_eq!((report.ctr_rows, report.cpa_rows), (2, 1));
        assert_eq!(report.ctr_path, plan.ctr_path);
        assert!(plan.ctr_path.is_file());
        assert!(plan.cpa_path.is_file());
        assert!(report.manifest_path.is_none());
    }
}
