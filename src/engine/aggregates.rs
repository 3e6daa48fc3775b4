//! Per-date futures open interest shares
//!
//! Each record's share of the date's total Future Index Long/Short
//! contracts. The denominator is the date's TOTAL row; when a date lacks
//! one, the sum of the participant rows stands in. Shares are fractions;
//! scaling to percent happens at render time.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{ClientType, DerivedRecord};

fn share(value: i64, total: i64) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(value as f64 / total as f64)
    }
}

pub fn apply(records: &mut [DerivedRecord]) {
    let mut totals: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
    let mut participant_sums: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
    for rec in records.iter() {
        if rec.raw.client_type == ClientType::Total {
            totals.insert(
                rec.raw.date,
                (rec.raw.future_index_long, rec.raw.future_index_short),
            );
        } else {
            let sums = participant_sums.entry(rec.raw.date).or_insert((0, 0));
            sums.0 += rec.raw.future_index_long;
            sums.1 += rec.raw.future_index_short;
        }
    }

    for rec in records.iter_mut() {
        let (long_total, short_total) = totals
            .get(&rec.raw.date)
            .or_else(|| participant_sums.get(&rec.raw.date))
            .copied()
            .unwrap_or((0, 0));
        rec.future_total_long_pct = share(rec.raw.future_index_long, long_total);
        rec.future_total_short_pct = share(rec.raw.future_index_short, short_total);
    }
}
