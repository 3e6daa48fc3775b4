//! Derived-metrics computation engine
//!
//! A pure function over an immutable snapshot: raw participant records plus
//! an optional spot series in, the fully annotated table out. Nothing here
//! touches the store or keeps state between invocations; recomputing over
//! equal inputs yields an identical table.

pub mod aggregates;
pub mod differ;
pub mod normalizer;
pub mod ratios;
pub mod spot;

use crate::models::{DerivedRecord, DerivedTable, IndexSpotSeries, OpenInterestRecord};
use self::differ::GroupIndex;

/// Run the full pipeline: canonical sort, structural check, group-relative
/// diffs, ratios and percentages, per-date shares, spot merge.
pub fn compute(mut records: Vec<OpenInterestRecord>, spots: &IndexSpotSeries) -> DerivedTable {
    normalizer::sort_canonical(&mut records);
    let gaps = normalizer::structural_gaps(&records);

    let mut derived: Vec<DerivedRecord> =
        records.into_iter().map(DerivedRecord::from_raw).collect();
    let index = GroupIndex::build(&derived);

    differ::apply(&mut derived, &index);
    ratios::apply(&mut derived, &index);
    aggregates::apply(&mut derived);
    spot::apply(&mut derived, &index, spots);

    DerivedTable {
        records: derived,
        gaps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClientType;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, d).unwrap()
    }

    /// Two full trading days, five categories each, TOTAL equal to the sum
    /// of the participant rows. Client's Future Index Long moves 1000 to
    /// 1200 day over day.
    fn two_day_fixture() -> Vec<OpenInterestRecord> {
        let mut records = Vec::new();
        // (client type, day-4 long/short, day-5 long/short)
        let books = [
            (ClientType::Client, (1000, 700), (1200, 650)),
            (ClientType::Dii, (2000, 1500), (2100, 1400)),
            (ClientType::Fii, (3000, 2500), (2900, 2700)),
            (ClientType::Pro, (500, 0), (600, 0)),
        ];
        for d in [4u32, 5] {
            let mut total_long = 0;
            let mut total_short = 0;
            for (ct, day4, day5) in books {
                let (long, short) = if d == 4 { day4 } else { day5 };
                let mut raw = OpenInterestRecord::zeroed(date(d), ct);
                raw.future_index_long = long;
                raw.future_index_short = short;
                raw.future_stock_long = long / 2;
                raw.future_stock_short = short / 2;
                raw.option_index_call_long = long / 10;
                raw.option_index_put_long = short / 10;
                raw.option_index_call_short = long / 20;
                raw.option_index_put_short = short / 20;
                records.push(raw);
                total_long += long;
                total_short += short;
            }
            let mut total = OpenInterestRecord::zeroed(date(d), ClientType::Total);
            total.future_index_long = total_long;
            total.future_index_short = total_short;
            records.push(total);
        }
        records
    }

    fn by_key(table: &DerivedTable, d: u32, ct: ClientType) -> &DerivedRecord {
        table
            .records
            .iter()
            .find(|r| r.raw.date == date(d) && r.raw.client_type == ct)
            .unwrap()
    }

    #[test]
    fn test_worked_example_day_change() {
        let table = compute(two_day_fixture(), &IndexSpotSeries::new());

        let newest = by_key(&table, 5, ClientType::Client);
        assert_eq!(newest.future_abs_change_long, Some(200));
        let oldest = by_key(&table, 4, ClientType::Client);
        assert_eq!(oldest.future_abs_change_long, None);
    }

    #[test]
    fn test_earliest_rows_have_no_derived_history() {
        let table = compute(two_day_fixture(), &IndexSpotSeries::new());

        for ct in ClientType::ALL {
            let rec = by_key(&table, 4, ct);
            assert_eq!(rec.net_call_change, None);
            assert_eq!(rec.net_put_change, None);
            assert_eq!(rec.net_diff, None);
            assert_eq!(rec.option_roc, None);
            assert_eq!(rec.future_roc, None);
            assert_eq!(rec.future_abs_change_long, None);
            assert_eq!(rec.future_abs_change_short, None);
            assert_eq!(rec.future_long_pct, None);
            assert_eq!(rec.future_short_pct, None);
            assert_eq!(rec.stock_roc, None);
            assert_eq!(rec.stock_abs_change_long, None);
            assert_eq!(rec.stock_abs_change_short, None);
            assert_eq!(rec.nifty_diff, None);
        }
    }

    #[test]
    fn test_zero_short_book_is_undefined_not_zero() {
        let table = compute(two_day_fixture(), &IndexSpotSeries::new());

        let pro = by_key(&table, 5, ClientType::Pro);
        assert_eq!(pro.raw.future_index_short, 0);
        assert_eq!(pro.future_ls_ratio, None);
        assert_eq!(pro.future_short_pct, None);
        // The long side is unaffected.
        assert_eq!(pro.future_abs_change_long, Some(100));
        assert_eq!(pro.future_long_pct, Some(0.2));
    }

    #[test]
    fn test_participant_shares_sum_to_one_per_date() {
        let table = compute(two_day_fixture(), &IndexSpotSeries::new());

        for d in [4u32, 5] {
            let long_sum: f64 = table
                .records
                .iter()
                .filter(|r| r.raw.date == date(d) && r.raw.client_type != ClientType::Total)
                .map(|r| r.future_total_long_pct.unwrap())
                .sum();
            assert!((long_sum - 1.0).abs() < 1e-9, "date {d}: {long_sum}");
        }
    }

    #[test]
    fn test_spot_only_on_newest_date() {
        let spots: IndexSpotSeries = [(date(5), 24550.0)].into_iter().collect();
        let table = compute(two_day_fixture(), &spots);

        let newest = by_key(&table, 5, ClientType::Client);
        assert_eq!(newest.nifty_spot, Some(24550.0));
        assert_eq!(newest.nifty_diff, None);
        let oldest = by_key(&table, 4, ClientType::Client);
        assert_eq!(oldest.nifty_spot, None);
        assert_eq!(oldest.nifty_diff, None);
    }

    #[test]
    fn test_spot_diff_on_both_dates() {
        let spots: IndexSpotSeries =
            [(date(4), 24300.0), (date(5), 24550.0)].into_iter().collect();
        let table = compute(two_day_fixture(), &spots);

        for ct in ClientType::ALL {
            assert_eq!(by_key(&table, 5, ct).nifty_diff, Some(250.0));
            assert_eq!(by_key(&table, 4, ct).nifty_diff, None);
        }
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let spots: IndexSpotSeries =
            [(date(4), 24300.0), (date(5), 24550.0)].into_iter().collect();
        let first = compute(two_day_fixture(), &spots);
        let second = compute(two_day_fixture(), &spots);
        assert_eq!(first, second);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let spots: IndexSpotSeries = [(date(5), 24550.0)].into_iter().collect();
        let forward = compute(two_day_fixture(), &spots);
        let mut reversed = two_day_fixture();
        reversed.reverse();
        let backward = compute(reversed, &spots);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_canonical_output_order() {
        let table = compute(two_day_fixture(), &IndexSpotSeries::new());

        let keys: Vec<(NaiveDate, ClientType)> = table
            .records
            .iter()
            .map(|r| (r.raw.date, r.raw.client_type))
            .collect();
        let mut expected = Vec::new();
        for d in [5u32, 4] {
            for ct in ClientType::ALL {
                expected.push((date(d), ct));
            }
        }
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_gap_reported_but_computation_proceeds() {
        let mut records = two_day_fixture();
        // Drop day 5's DII row.
        records.retain(|r| !(r.date == date(5) && r.client_type == ClientType::Dii));
        let table = compute(records, &IndexSpotSeries::new());

        assert_eq!(table.gaps.len(), 1);
        assert_eq!(table.gaps[0].date, date(5));
        assert_eq!(table.gaps[0].missing, vec![ClientType::Dii]);
        assert_eq!(table.records.len(), 9);
        // The remaining rows still derive normally.
        assert_eq!(
            by_key(&table, 5, ClientType::Client).future_abs_change_long,
            Some(200)
        );
    }

    #[test]
    fn test_empty_input() {
        let table = compute(Vec::new(), &IndexSpotSeries::new());
        assert!(table.is_empty());
        assert!(table.gaps.is_empty());
    }

    #[test]
    fn test_option_metrics_on_worked_fixture() {
        let table = compute(two_day_fixture(), &IndexSpotSeries::new());

        // Day 4 Client: calls 100 long / 50 short, puts 70 long / 35 short.
        // Day 5 Client: calls 120 long / 60 short, puts 65 long / 32 short.
        let oldest = by_key(&table, 4, ClientType::Client);
        assert_eq!(oldest.abs_change_call, 50);
        assert_eq!(oldest.abs_change_put, 35);
        assert_eq!(oldest.option_net, (100 + 35) - (70 + 50));

        let newest = by_key(&table, 5, ClientType::Client);
        assert_eq!(newest.abs_change_call, 60);
        assert_eq!(newest.abs_change_put, 33);
        assert_eq!(newest.net_call_change, Some(10));
        assert_eq!(newest.net_put_change, Some(-2));
        assert_eq!(newest.net_diff, Some(12));
        // One day of history only: the spread's own day change needs two.
        assert_eq!(newest.option_roc, None);
    }
}
