//! Domain types: one parsed input row and the running totals per campaign.
//!
//! A row is validated as a unit. Any bad field rejects the whole row, so a
//! `CampaignRecord` that exists always carries a non-empty key and four
//! non-negative finite values.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Borrowed string fields of one input row, in the order the parser
/// resolved them from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    pub campaign_id: &'a str,
    pub impressions: &'a str,
    pub clicks: &'a str,
    pub spend: &'a str,
    pub conversions: &'a str,
}

/// Why a row was rejected. Row-level only; never fatal to a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("campaign_id is empty after trimming")]
    EmptyKey,

    #[error("field '{field}' is not a non-negative integer: {value:?}")]
    InvalidCount { field: &'static str, value: String },

    #[error("spend is not a non-negative finite number: {0:?}")]
    InvalidSpend(String),
}

/// A validated input row.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignRecord {
    pub campaign_id: String,
    pub impressions: u64,
    pub clicks: u64,
    pub spend: f64,
    pub conversions: u64,
}

impl CampaignRecord {
    /// Parse a raw row. Only the campaign key is trimmed; numeric fields
    /// must parse verbatim.
    pub fn parse(raw: &RawRecord<'_>) -> Result<Self, RecordError> {
        let campaign_id = raw.campaign_id.trim();
        if campaign_id.is_empty() {
            return Err(RecordError::EmptyKey);
        }

        let impressions = parse_count("impressions", raw.impressions)?;
        let clicks = parse_count("clicks", raw.clicks)?;
        let spend = parse_spend(raw.spend)?;
        let conversions = parse_count("conversions", raw.conversions)?;

        Ok(Self {
            campaign_id: campaign_id.to_string(),
            impressions,
            clicks,
            spend,
            conversions,
        })
    }
}

fn parse_count(field: &'static str, value: &str) -> Result<u64, RecordError> {
    value.parse::<u64>().map_err(|_| RecordError::InvalidCount {
        field,
        value: value.to_string(),
    })
}

fn parse_spend(value: &str) -> Result<f64, RecordError> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(RecordError::InvalidSpend(value.to_string())),
    }
}

/// Running totals for one campaign key.
///
/// Created zeroed on the first sighting of a key and only ever added to.
/// Counters saturate at `u64::MAX` instead of wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignTotals {
    pub impressions: u64,
    pub clicks: u64,
    pub spend: f64,
    pub conversions: u64,
}

impl CampaignTotals {
    /// Fold one validated record into these totals.
    pub fn add(&mut self, record: &CampaignRecord) {
        self.impressions = self.impressions.saturating_add(record.impressions);
        self.clicks = self.clicks.saturating_add(record.clicks);
        self.spend += record.spend;
        self.conversions = self.conversions.saturating_add(record.conversions);
    }

    /// Field-wise sum of two totals for the same key.
    pub fn merge(&mut self, other: &CampaignTotals) {
        self.impressions = self.impressions.saturating_add(other.impressions);
        self.clicks = self.clicks.saturating_add(other.clicks);
        self.spend += other.spend;
        self.conversions = self.conversions.saturating_add(other.conversions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw<'a>(id: &'a str, imp: &'a str, clk: &'a str, spend: &'a str, conv: &'a str) -> RawRecord<'a> {
        RawRecord {
            campaign_id: id,
            impressions: imp,
            clicks: clk,
            spend,
            conversions: conv,
        }
    }

    #[test]
    fn parse_valid_row() {
        let rec = CampaignRecord::parse(&raw("  CMP001 ", "100", "10", "5.00", "2")).unwrap();
        assert_eq!(rec.campaign_id, "CMP001");
        assert_eq!(rec.impressions, 100);
        assert_eq!(rec.clicks, 10);
        assert!((rec.spend - 5.0).abs() < 1e-12);
        assert_eq!(rec.conversions, 2);
    }

    #[test]
    fn empty_key_rejected() {
        let err = CampaignRecord::parse(&raw("   ", "1", "1", "1.0", "1")).unwrap_err();
        assert_eq!(err, RecordError::EmptyKey);
    }

    #[test]
    fn negative_count_rejects_row() {
        let err = CampaignRecord::parse(&raw("A", "-5", "1", "1.0", "1")).unwrap_err();
        assert!(matches!(err, RecordError::InvalidCount { field: "impressions", .. }));
    }

    #[test]
    fn non_numeric_spend_rejects_row() {
        let err = CampaignRecord::parse(&raw("A", "5", "1", "abc", "1")).unwrap_err();
        assert_eq!(err, RecordError::InvalidSpend("abc".into()));
    }

    #[test]
    fn negative_and_non_finite_spend_rejected() {
        for bad in ["-0.01", "NaN", "inf", "-inf", ""] {
            assert!(
                CampaignRecord::parse(&raw("A", "5", "1", bad, "1")).is_err(),
                "spend {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn numeric_fields_are_not_trimmed() {
        assert!(CampaignRecord::parse(&raw("A", " 5", "1", "1.0", "1")).is_err());
        assert!(CampaignRecord::parse(&raw("A", "5", "1", "1.0 ", "1")).is_err());
    }

    #[test]
    fn fractional_count_rejected() {
        let err = CampaignRecord::parse(&raw("A", "5", "1.5", "1.0", "1")).unwrap_err();
        assert!(matches!(err, RecordError::InvalidCount { field: "clicks", .. }));
    }

    #[test]
    fn totals_saturate_instead_of_wrapping() {
        let mut totals = CampaignTotals {
            impressions: u64::MAX - 1,
            ..Default::default()
        };
        let rec = CampaignRecord {
            campaign_id: "A".into(),
            impressions: 10,
            clicks: 0,
            spend: 0.0,
            conversions: 0,
        };
        totals.add(&rec);
        assert_eq!(totals.impressions, u64::MAX);
    }
}
