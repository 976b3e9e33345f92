//! Aggregator — folds the record stream into per-campaign totals.
//!
//! The aggregator owns the `key -> totals` map for the lifetime of one run.
//! It is mutated only during the ingest phase and read by the selection phase
//! through `totals()`. Rows that fail validation are counted as skipped and
//! leave every total untouched.

use std::collections::HashMap;

use crate::domain::{CampaignRecord, CampaignTotals, RawRecord, RecordError};

/// Outcome of a single `ingest` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The row was valid and its values were added to its key.
    Folded,
    /// The row was rejected; no counter was touched.
    Skipped(RecordError),
}

impl IngestOutcome {
    pub fn is_folded(&self) -> bool {
        matches!(self, Self::Folded)
    }
}

/// Per-campaign totals accumulated over one pass of the input.
#[derive(Debug, Default, Clone)]
pub struct Aggregator {
    totals: HashMap<String, CampaignTotals>,
    processed: u64,
    skipped: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate one raw row and fold it into its campaign's totals.
    pub fn ingest(&mut self, raw: &RawRecord<'_>) -> IngestOutcome {
        match CampaignRecord::parse(raw) {
            Ok(record) => {
                self.fold(record);
                IngestOutcome::Folded
            }
            Err(e) => {
                self.skipped += 1;
                IngestOutcome::Skipped(e)
            }
        }
    }

    /// Fold an already-validated record.
    pub fn fold(&mut self, record: CampaignRecord) {
        match self.totals.get_mut(record.campaign_id.as_str()) {
            Some(totals) => totals.add(&record),
            None => {
                let mut totals = CampaignTotals::default();
                totals.add(&record);
                self.totals.insert(record.campaign_id, totals);
            }
        }
        self.processed += 1;
    }

    /// Count a row the parser rejected before it could be split into fields
    /// (wrong field count, undecodable bytes).
    pub fn note_skipped(&mut self) {
        self.skipped += 1;
    }

    /// Merge another aggregator's totals into this one.
    ///
    /// Totals are additive, so merging per-shard aggregators gives the same
    /// result as aggregating the concatenated input.
    pub fn merge(&mut self, other: Aggregator) {
        for (key, totals) in other.totals {
            self.totals.entry(key).or_default().merge(&totals);
        }
        self.processed += other.processed;
        self.skipped += other.skipped;
    }

    /// Rows successfully parsed and folded in.
    pub fn processed_count(&self) -> u64 {
        self.processed
    }

    /// Rows rejected at the row level.
    pub fn skipped_count(&self) -> u64 {
        self.skipped
    }

    pub fn distinct_count(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn get(&self, campaign_id: &str) -> Option<&CampaignTotals> {
        self.totals.get(campaign_id)
    }

    /// Read-only view of every campaign's totals, in unspecified order.
    pub fn totals(&self) -> impl Iterator<Item = (&str, &CampaignTotals)> + '_ {
        self.totals.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<'a> Extend<RawRecord<'a>> for Aggregator {
    fn extend<I: IntoIterator<Item = RawRecord<'a>>>(&mut self, iter: I) {
        for raw in iter {
            self.ingest(&raw);
        }
    }
}
