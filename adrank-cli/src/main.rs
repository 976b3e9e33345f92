//! adrank CLI — rank advertising campaigns by CTR and CPA.
//!
//! Reads a campaign CSV (`campaign_id,impressions,clicks,spend,conversions`,
//! extra columns ignored), aggregates per campaign and writes two top-K
//! leaderboards into the output directory.
//!
//! Flags override values loaded with `--config`. Logs go to stderr and are
//! controlled by `RUST_LOG` (default `adrank=info`); stdout carries only the
//! run summary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use adrank_runner::{run_plan, RunConfig, RunReport};

#[derive(Parser)]
#[command(
    name = "adrank",
    about = "Aggregate campaign events and report the top-K campaigns by CTR and CPA"
)]
struct Cli {
    /// Path to the input CSV file.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output directory for the result CSV files (created if missing).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of campaigns per leaderboard. Defaults to 10.
    #[arg(long, allow_negative_numbers = true)]
    top_k: Option<i64>,

    /// TOML config file; flags given on the command line take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// File name of the CTR leaderboard. Defaults to top10_ctr.csv.
    #[arg(long)]
    ctr_file: Option<String>,

    /// File name of the CPA leaderboard. Defaults to top10_cpa.csv.
    #[arg(long)]
    cpa_file: Option<String>,

    /// Also write run_manifest.json with row counts and output digests.
    #[arg(long, default_value_t = false)]
    manifest: bool,
}

impl Cli {
    fn into_config(self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => RunConfig::default(),
        };

        if let Some(input) = self.input {
            config.input = Some(input);
        }
        if let Some(output) = self.output {
            config.output_dir = Some(output);
        }
        if let Some(top_k) = self.top_k {
            config.top_k = top_k;
        }
        if let Some(name) = self.ctr_file {
            config.ctr_file = name;
        }
        if let Some(name) = self.cpa_file {
            config.cpa_file = name;
        }
        config.write_manifest |= self.manifest;

        Ok(config)
    }
}

fn main() -> Result<()> {
    init_tracing();

    let config = Cli::parse().into_config()?;
    // Surface configuration problems before any file is touched.
    let plan = config.resolve().context("invalid configuration")?;
    debug!(?plan, "resolved run plan");

    let report = run_plan(&plan).context("run failed")?;
    print_summary(&report);

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "adrank=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_summary(report: &RunReport) {
    println!("Processed rows: {}", report.stats.processed_rows);
    println!("Distinct campaigns: {}", report.distinct_campaigns);
    println!("Top CTR output: {}", report.ctr_path.display());
    println!("Top CPA output: {}", report.cpa_path.display());
    if let Some(path) = &report.manifest_path {
        println!("Run manifest: {}", path.display());
    }
    println!("Elapsed time: {:?}", report.elapsed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("adrank.toml");
        fs::write(
            &path,
            r#"
input = "data/ad.csv"
output_dir = "from_file"
top_k = 3
ctr_file = "ctr_from_file.csv"
"#,
        )
        .unwrap();
        path
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path());

        let cli = Cli::parse_from([
            "adrank",
            "--config",
            path.to_str().unwrap(),
            "--top-k",
            "7",
            "--output",
            "from_flag",
            "--manifest",
        ]);
        let config = cli.into_config().unwrap();

        assert_eq!(config.top_k, 7);
        assert_eq!(config.output_dir, Some(PathBuf::from("from_flag")));
        assert_eq!(config.input, Some(PathBuf::from("data/ad.csv")));
        assert_eq!(config.ctr_file, "ctr_from_file.csv");
        assert_eq!(config.cpa_file, RunConfig::default().cpa_file);
        assert!(config.write_manifest);
    }

    #[test]
    fn config_file_values_survive_without_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path());

        let config = Cli::parse_from(["adrank", "--config", path.to_str().unwrap()])
            .into_config()
            .unwrap();

        assert_eq!(config.top_k, 3);
        assert_eq!(config.output_dir, Some(PathBuf::from("from_file")));
        assert!(!config.write_manifest);
    }

    #[test]
    fn negative_top_k_reaches_validation() {
        let config = Cli::parse_from(["adrank", "--input", "a.csv", "--output", "out", "--top-k", "-2"])
            .into_config()
            .unwrap();
        assert_eq!(config.top_k, -2);
        assert!(config.resolve().is_err());
    }

    #[test]
    fn unreadable_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let cli = Cli::parse_from(["adrank", "--config", missing.to_str().unwrap()]);
        assert!(cli.into_config().is_err());
    }
}
