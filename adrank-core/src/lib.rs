//! adrank core — streaming campaign aggregation and bounded top-K ranking.
//!
//! The engine runs in two sequential phases:
//! - **Accumulate**: `Aggregator` folds each input row into per-campaign
//!   totals in a single pass.
//! - **Select**: `rank_campaigns` derives CTR/CPA per campaign and feeds two
//!   independent `BoundedTopK` selectors, one per `RankingMetric`.
//!
//! Row parsing from a concrete file format and rendering of results live in
//! `adrank-runner`; this crate only sees `RawRecord` fields and returns
//! `CampaignMetrics` values.

pub mod aggregate;
pub mod domain;
pub mod metrics;
pub mod ranking;
pub mod select;
pub mod topk;

pub use aggregate::{Aggregator, IngestOutcome};
pub use domain::{CampaignRecord, CampaignTotals, RawRecord, RecordError};
pub use metrics::{derive, CampaignMetrics};
pub use ranking::RankingMetric;
pub use select::{rank_campaigns, select_top, selector, Rankings};
pub use topk::{BoundedTopK, Offer};
