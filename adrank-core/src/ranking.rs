//! Ranking orders for the two leaderboards.
//!
//! Each metric defines a strict total order over eligible campaigns.
//! `compare(a, b) == Less` means `a` ranks ahead of `b`. Metric values are
//! compared with `f64::total_cmp` and ties fall back to the campaign key in
//! ascending byte order, so no two distinct campaigns ever compare equal.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::metrics::CampaignMetrics;

/// Which derived metric a leaderboard ranks by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMetric {
    /// Click-through rate, higher is better.
    Ctr,
    /// Cost per acquisition, lower is better.
    Cpa,
}

impl RankingMetric {
    pub const ALL: [RankingMetric; 2] = [RankingMetric::Ctr, RankingMetric::Cpa];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ctr => "CTR",
            Self::Cpa => "CPA",
        }
    }

    /// Every campaign has a CTR; only campaigns with conversions have a CPA.
    pub fn is_eligible(&self, m: &CampaignMetrics) -> bool {
        match self {
            Self::Ctr => true,
            Self::Cpa => m.cpa.is_some(),
        }
    }

    /// The value this metric ranks on, if the campaign has one.
    pub fn value(&self, m: &CampaignMetrics) -> Option<f64> {
        match self {
            Self::Ctr => Some(m.ctr),
            Self::Cpa => m.cpa,
        }
    }

    pub fn is_higher_better(&self) -> bool {
        matches!(self, Self::Ctr)
    }

    /// Rank order: `Less` when `a` is better than `b`.
    ///
    /// Only meaningful for eligible campaigns. An ineligible campaign sorts
    /// behind every eligible one.
    pub fn compare(&self, a: &CampaignMetrics, b: &CampaignMetrics) -> Ordering {
        let by_value = match (self.value(a), self.value(b)) {
            (Some(x), Some(y)) if self.is_higher_better() => y.total_cmp(&x),
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_value.then_with(|| a.campaign_id.cmp(&b.campaign_id))
    }

    /// True if `a` strictly outranks `b`.
    pub fn is_better(&self, a: &CampaignMetrics, b: &CampaignMetrics) -> bool {
        self.compare(a, b) == Ordering::Less
    }
}
