//! Long/short ratios and percentage changes
//!
//! Runs after the differencer: percentage changes divide the filled
//! day-change fields by the previous day's level. Division by zero and
//! missing history both yield `None`.

use crate::engine::differ::GroupIndex;
use crate::models::DerivedRecord;

fn ratio(long: i64, short: i64) -> Option<f64> {
    if short == 0 {
        None
    } else {
        Some(long as f64 / short as f64)
    }
}

/// Day change over the previous day's level, as a fraction.
fn pct_change(change: Option<i64>, prev_level: Option<i64>) -> Option<f64> {
    match (change, prev_level) {
        (Some(c), Some(p)) if p != 0 => Some(c as f64 / p as f64),
        _ => None,
    }
}

pub fn apply(records: &mut [DerivedRecord], index: &GroupIndex) {
    for rec in records.iter_mut() {
        rec.future_ls_ratio = ratio(rec.raw.future_index_long, rec.raw.future_index_short);
        rec.stock_ls_ratio = ratio(rec.raw.future_stock_long, rec.raw.future_stock_short);
    }

    for (cur, prev) in index.pairs() {
        let prev_levels = prev.map(|p| {
            let r = &records[p].raw;
            (
                r.future_index_long,
                r.future_index_short,
                r.future_stock_long,
                r.future_stock_short,
            )
        });
        let rec = &mut records[cur];
        rec.future_long_pct =
            pct_change(rec.future_abs_change_long, prev_levels.map(|v| v.0));
        rec.future_short_pct =
            pct_change(rec.future_abs_change_short, prev_levels.map(|v| v.1));
        rec.stock_long_pct =
            pct_change(rec.stock_abs_change_long, prev_levels.map(|v| v.2));
        rec.stock_short_pct =
            pct_change(rec.stock_abs_change_short, prev_levels.map(|v| v.3));
    }
}
