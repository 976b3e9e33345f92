//! Derived per-campaign ratios.
//!
//! CTR is always defined and falls back to 0 when a campaign has no
//! impressions. CPA exists only for campaigns with at least one conversion;
//! otherwise it is `None` and is never ranked or rendered as a number.

use serde::{Deserialize, Serialize};

use crate::domain::CampaignTotals;

/// Immutable snapshot of one campaign's totals plus its derived ratios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignMetrics {
    pub campaign_id: String,
    pub impressions: u64,
    pub clicks: u64,
    pub spend: f64,
    pub conversions: u64,
    pub ctr: f64,
    pub cpa: Option<f64>,
}

impl CampaignMetrics {
    pub fn has_cpa(&self) -> bool {
        self.cpa.is_some()
    }
}

/// Build the metrics snapshot for one campaign from its final totals.
pub fn derive(campaign_id: &str, totals: &CampaignTotals) -> CampaignMetrics {
    let ctr = if totals.impressions > 0 {
        totals.clicks as f64 / totals.impressions as f64
    } else {
        0.0
    };

    let cpa = (totals.conversions > 0).then(|| totals.spend / totals.conversions as f64);

    CampaignMetrics {
        campaign_id: campaign_id.to_string(),
        impressions: totals.impressions,
        clicks: totals.clicks,
        spend: totals.spend,
        conversions: totals.conversions,
        ctr,
        cpa,
    }
}
