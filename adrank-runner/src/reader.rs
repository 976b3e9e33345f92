//! CSV record reader feeding the aggregator.
//!
//! The header row is resolved once: names are trimmed, column order is free
//! and unknown columns are ignored. A missing required column is fatal before
//! any data row is read.
//!
//! Data rows are handled one at a time and never abort the run:
//! - wrong field count or undecodable bytes → skipped by the reader
//! - empty key, unparsable or negative value → skipped by the aggregator
//!
//! Only I/O failures of the underlying source are fatal.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ErrorKind, StringRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use adrank_core::{Aggregator, IngestOutcome, RawRecord, RecordError};

/// Columns every input must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = ["campaign_id", "impressions", "clicks", "spend", "conversions"];

const INPUT_BUFFER_BYTES: usize = 1024 * 1024;

/// Errors that stop a read.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to open input {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read CSV header: {0}")]
    Header(#[source] csv::Error),

    #[error("missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("failed while reading CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Positions of the required columns in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub campaign_id: usize,
    pub impressions: usize,
    pub clicks: usize,
    pub spend: usize,
    pub conversions: usize,
}

impl ColumnIndex {
    /// Locate every required column. When a name repeats, the last
    /// occurrence wins.
    pub fn resolve(headers: &StringRecord) -> Result<Self, ReadError> {
        let mut found = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, name) in found.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers
                .iter()
                .enumerate()
                .filter(|(_, h)| h.trim() == name)
                .map(|(idx, _)| idx)
                .last()
                .ok_or(ReadError::MissingColumn(name))?;
        }

        let [campaign_id, impressions, clicks, spend, conversions] = found;
        Ok(Self {
            campaign_id,
            impressions,
            clicks,
            spend,
            conversions,
        })
    }

    /// Borrow the required fields of one row.
    pub fn project<'r>(&self, record: &'r StringRecord) -> RawRecord<'r> {
        RawRecord {
            campaign_id: record.get(self.campaign_id).unwrap_or(""),
            impressions: record.get(self.impressions).unwrap_or(""),
            clicks: record.get(self.clicks).unwrap_or(""),
            spend: record.get(self.spend).unwrap_or(""),
            conversions: record.get(self.conversions).unwrap_or(""),
        }
    }
}

/// Row counts for one read. `total_rows - processed_rows` is the only place
/// skipped rows become visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadStats {
    pub total_rows: u64,
    pub processed_rows: u64,
    pub skipped_rows: u64,
}

// Per-reason totals, logged once at the end of a read.
#[derive(Debug, Default)]
struct SkipTally {
    field_count: u64,
    encoding: u64,
    empty_key: u64,
    invalid_count: u64,
    invalid_spend: u64,
}

impl SkipTally {
    fn record(&mut self, reason: &RecordError) {
        match reason {
            RecordError::EmptyKey => self.empty_key += 1,
            RecordError::InvalidCount { .. } => self.invalid_count += 1,
            RecordError::InvalidSpend(_) => self.invalid_spend += 1,
        }
    }
}

/// Streaming reader over a campaign CSV.
pub struct CampaignReader<R> {
    rdr: csv::Reader<R>,
    columns: ColumnIndex,
}

impl CampaignReader<File> {
    pub fn open(path: &Path) -> Result<Self, ReadError> {
        let file = File::open(path).map_err(|source| ReadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }
}

impl<R: Read> CampaignReader<R> {
    /// Wrap a source and resolve its header row.
    pub fn from_reader(source: R) -> Result<Self, ReadError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .buffer_capacity(INPUT_BUFFER_BYTES)
            .from_reader(source);

        let headers = rdr.headers().map_err(ReadError::Header)?;
        let columns = ColumnIndex::resolve(headers)?;
        debug!(?columns, header_fields = headers.len(), "resolved input columns");

        Ok(Self { rdr, columns })
    }

    /// Read every remaining row into `agg`.
    pub fn aggregate_into(&mut self, agg: &mut Aggregator) -> Result<ReadStats, ReadError> {
        let mut stats = ReadStats::default();
        let mut tally = SkipTally::default();
        let mut record = StringRecord::new();

        loop {
            match self.rdr.read_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    match e.kind() {
                        ErrorKind::UnequalLengths { .. } => tally.field_count += 1,
                        ErrorKind::Utf8 { .. } => tally.encoding += 1,
                        _ => return Err(ReadError::Csv(e)),
                    }
                    stats.total_rows += 1;
                    stats.skipped_rows += 1;
                    agg.note_skipped();
                    continue;
                }
            }

            stats.total_rows += 1;
            match agg.ingest(&self.columns.project(&record)) {
                IngestOutcome::Folded => stats.processed_rows += 1,
                IngestOutcome::Skipped(reason) => {
                    tally.record(&reason);
                    stats.skipped_rows += 1;
                }
            }
        }

        debug!(
            field_count = tally.field_count,
            encoding = tally.encoding,
            empty_key = tally.empty_key,
            invalid_count = tally.invalid_count,
            invalid_spend = tally.invalid_spend,
            "skipped rows by reason"
        );
        Ok(stats)
    }
}
