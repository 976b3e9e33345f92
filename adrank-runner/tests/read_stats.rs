//! Property tests for row accounting in the CSV reader.
//!
//! Skipped rows never surface individually; the only trace they leave is
//! `total_rows - processed_rows`. These checks pin that accounting down for
//! arbitrary mixes of valid and malformed lines.

use std::num::NonZeroUsize;

use adrank_runner::{aggregate_csv, rank_csv};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Line {
    Valid { key: &'static str, impressions: u32, clicks: u32, cents: u32, conversions: u8 },
    BadSpend(&'static str),
    NegativeCount(&'static str),
    EmptyKey,
    ShortRow(&'static str),
}

impl Line {
    fn render(&self) -> String {
        match self {
            Line::Valid { key, impressions, clicks, cents, conversions } => format!(
                "{key},{impressions},{clicks},{}.{:02},{conversions}",
                cents / 100,
                cents % 100
            ),
            Line::BadSpend(key) => format!("{key},10,1,abc,1"),
            Line::NegativeCount(key) => format!("{key},10,-1,1.00,1"),
            Line::EmptyKey => "  ,10,1,1.00,1".to_string(),
            Line::ShortRow(key) => format!("{key},10,1"),
        }
    }

    fn is_valid(&self) -> bool {
        matches!(self, Line::Valid { .. })
    }
}

fn arb_key() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["alpha", "beta", "gamma", "delta"])
}

fn arb_line() -> impl Strategy<Value = Line> {
    prop_oneof![
        4 => (arb_key(), 0u32..10_000, 0u32..500, 0u32..100_000, 0u8..4).prop_map(
            |(key, impressions, clicks, cents, conversions)| Line::Valid {
                key,
                impressions,
                clicks,
                cents,
                conversions,
            }
        ),
        1 => arb_key().prop_map(Line::BadSpend),
        1 => arb_key().prop_map(Line::NegativeCount),
        1 => Just(Line::EmptyKey),
        1 => arb_key().prop_map(Line::ShortRow),
    ]
}

fn render(lines: &[Line]) -> String {
    let mut csv = String::from("campaign_id,impressions,clicks,spend,conversions\n");
    for line in lines {
        csv.push_str(&line.render());
        csv.push('\n');
    }
    csv
}

proptest! {
    #[test]
    fn processed_counts_only_valid_rows(lines in prop::collection::vec(arb_line(), 0..80)) {
        let (agg, stats) = aggregate_csv(render(&lines).as_bytes()).unwrap();
        let valid = lines.iter().filter(|l| l.is_valid()).count() as u64;

        prop_assert_eq!(stats.total_rows, lines.len() as u64);
        prop_assert_eq!(stats.processed_rows, valid);
        prop_assert_eq!(stats.skipped_rows, lines.len() as u64 - valid);
        prop_assert_eq!(agg.processed_count(), valid);
        prop_assert_eq!(agg.skipped_count(), stats.skipped_rows);
    }

    #[test]
    fn malformed_rows_do_not_change_rankings(lines in prop::collection::vec(arb_line(), 0..80)) {
        let k = NonZeroUsize::new(3).unwrap();
        let valid_only: Vec<Line> = lines.iter().filter(|l| l.is_valid()).cloned().collect();

        let (with_noise, _) = rank_csv(render(&lines).as_bytes(), k).unwrap();
        let (clean, _) = rank_csv(render(&valid_only).as_bytes(), k).unwrap();
        prop_assert_eq!(with_noise, clean);
    }
}
