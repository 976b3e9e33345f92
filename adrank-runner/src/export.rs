//! Leaderboard export — CSV rendering of ranked campaigns.
//!
//! Columns: campaign_id, total_impressions, total_clicks, total_spend,
//! total_conversions, CTR, CPA
//!
//! Spend is written with 2 decimals, CTR and CPA with 6. A campaign without
//! conversions has an empty CPA field.
//!
//! Files are written to a hidden staging file in the target directory and
//! renamed into place once complete. A failed write removes the staging file,
//! so the final path either holds a complete leaderboard or is untouched.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use adrank_core::CampaignMetrics;

pub const OUTPUT_HEADER: [&str; 7] = [
    "campaign_id",
    "total_impressions",
    "total_clicks",
    "total_spend",
    "total_conversions",
    "CTR",
    "CPA",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush CSV writer: {0}")]
    Flush(#[source] std::io::Error),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Render one leaderboard row.
pub fn format_row(m: &CampaignMetrics) -> [String; 7] {
    [
        m.campaign_id.clone(),
        m.impressions.to_string(),
        m.clicks.to_string(),
        format!("{:.2}", m.spend),
        m.conversions.to_string(),
        format!("{:.6}", m.ctr),
        m.cpa.map(|cpa| format!("{cpa:.6}")).unwrap_or_default(),
    ]
}

/// Write a leaderboard (header + rows) to `writer`, returning it flushed.
pub fn write_rankings_csv<W: Write>(writer: W, rows: &[CampaignMetrics]) -> Result<W, ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(OUTPUT_HEADER)?;
    for m in rows {
        wtr.write_record(format_row(m))?;
    }
    wtr.into_inner().map_err(|e| ExportError::Flush(e.into_error()))
}

/// Render a leaderboard to a CSV string.
pub fn export_rankings_csv(rows: &[CampaignMetrics]) -> Result<String, ExportError> {
    let data = write_rankings_csv(Vec::new(), rows)?;
    Ok(String::from_utf8(data)?)
}

/// Write a leaderboard to `path` through a staging file.
pub fn save_rankings(path: &Path, rows: &[CampaignMetrics]) -> Result<(), ExportError> {
    let staging = staging_path(path);
    let result = write_file(&staging, rows).and_then(|()| {
        fs::rename(&staging, path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })
    });

    if result.is_err() {
        // The staging file may never have been created.
        let _ = fs::remove_file(&staging);
    }
    result
}

fn write_file(path: &Path, rows: &[CampaignMetrics]) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let file = write_rankings_csv(file, rows)?;
    file.sync_all().map_err(io_err)
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.partial"))
}
