//! Selection phase: derive metrics per campaign and fill both leaderboards.
//!
//! Runs after aggregation has finished. Every campaign is derived once and
//! offered to the CTR and CPA selectors independently; each selector applies
//! its own eligibility filter and rank order.

use std::cmp::Ordering;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregator;
use crate::metrics::{derive, CampaignMetrics};
use crate::ranking::RankingMetric;
use crate::topk::BoundedTopK;

/// Final ordered leaderboards, best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rankings {
    pub ctr: Vec<CampaignMetrics>,
    pub cpa: Vec<CampaignMetrics>,
    /// Campaigns offered to the selectors (the distinct key count).
    pub candidates: usize,
    /// Campaigns with at least one conversion.
    pub cpa_eligible: usize,
}

impl Rankings {
    pub fn get(&self, metric: RankingMetric) -> &[CampaignMetrics] {
        match metric {
            RankingMetric::Ctr => &self.ctr,
            RankingMetric::Cpa => &self.cpa,
        }
    }
}

/// A bounded selector ranking by `metric`.
pub fn selector(
    metric: RankingMetric,
    k: NonZeroUsize,
) -> BoundedTopK<CampaignMetrics, impl Fn(&CampaignMetrics, &CampaignMetrics) -> Ordering + Copy> {
    BoundedTopK::new(k, move |a: &CampaignMetrics, b: &CampaignMetrics| {
        metric.compare(a, b)
    })
}

/// Select the top `k` eligible candidates under `metric`, best first.
pub fn select_top<I>(metric: RankingMetric, k: NonZeroUsize, candidates: I) -> Vec<CampaignMetrics>
where
    I: IntoIterator<Item = CampaignMetrics>,
{
    let mut top = selector(metric, k);
    for m in candidates {
        if metric.is_eligible(&m) {
            top.offer(m);
        }
    }
    top.into_sorted_vec()
}

/// Rank every aggregated campaign under both metrics.
pub fn rank_campaigns(agg: &Aggregator, k: NonZeroUsize) -> Rankings {
    let mut ctr = selector(RankingMetric::Ctr, k);
    let mut cpa = selector(RankingMetric::Cpa, k);
    let mut candidates = 0;
    let mut cpa_eligible = 0;

    for (campaign_id, totals) in agg.totals() {
        let m = derive(campaign_id, totals);
        candidates += 1;

        if RankingMetric::Cpa.is_eligible(&m) {
            cpa_eligible += 1;
            cpa.offer(m.clone());
        }
        ctr.offer(m);
    }

    Rankings {
        ctr: ctr.into_sorted_vec(),
        cpa: cpa.into_sorted_vec(),
        candidates,
        cpa_eligible,
    }
}
