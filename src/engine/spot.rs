//! Index spot merge
//!
//! Broadcasts the spot close of each date to all of that date's client-type
//! rows, then derives the day-over-day spot difference through the
//! group-relative differencer so it obeys the same predecessor rule as
//! every other change column.

use crate::engine::differ::{self, GroupIndex};
use crate::models::{DerivedRecord, IndexSpotSeries};

pub fn apply(records: &mut [DerivedRecord], index: &GroupIndex, spots: &IndexSpotSeries) {
    for rec in records.iter_mut() {
        rec.nifty_spot = spots.get(rec.raw.date);
    }
    differ::diff_opt_f64(records, index, |r| r.nifty_spot, |r, v| r.nifty_diff = v);
}
