//! Group-relative differencing
//!
//! Every "change since the previous trading day" metric compares a record
//! against the same client type's record at the nearest earlier date with
//! data, never against an adjacent row of the flat table. In canonical order
//! (date descending) that predecessor is simply the next row position within
//! the client-type group, so the whole family of diffs runs off one ordered
//! index of row positions per group.

use std::collections::BTreeMap;

use crate::models::{ClientType, DerivedRecord};

/// Row positions per client type, in canonical (newest-first) order.
///
/// Built over an already canonically sorted slice; the successor inside a
/// group is that client type's previous trading day.
pub struct GroupIndex {
    groups: BTreeMap<ClientType, Vec<usize>>,
}

impl GroupIndex {
    pub fn build(records: &[DerivedRecord]) -> Self {
        let mut groups: BTreeMap<ClientType, Vec<usize>> = BTreeMap::new();
        for (pos, rec) in records.iter().enumerate() {
            groups.entry(rec.raw.client_type).or_default().push(pos);
        }
        GroupIndex { groups }
    }

    /// Iterate `(row, previous-day row)` over every record. The earliest row
    /// of each group pairs with `None`.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, Option<usize>)> + '_ {
        self.groups.values().flat_map(|positions| {
            positions
                .iter()
                .enumerate()
                .map(move |(i, &pos)| (pos, positions.get(i + 1).copied()))
        })
    }
}

/// `set(cur, get(cur) - get(prev))`, `None` when there is no predecessor.
pub fn diff_i64(
    records: &mut [DerivedRecord],
    index: &GroupIndex,
    get: fn(&DerivedRecord) -> i64,
    set: fn(&mut DerivedRecord, Option<i64>),
) {
    for (cur, prev) in index.pairs() {
        let delta = prev.map(|p| get(&records[cur]) - get(&records[p]));
        set(&mut records[cur], delta);
    }
}

/// Like [`diff_i64`] over an already-optional column; a `None` operand on
/// either side yields `None`.
pub fn diff_opt_i64(
    records: &mut [DerivedRecord],
    index: &GroupIndex,
    get: fn(&DerivedRecord) -> Option<i64>,
    set: fn(&mut DerivedRecord, Option<i64>),
) {
    for (cur, prev) in index.pairs() {
        let delta = match (get(&records[cur]), prev.and_then(|p| get(&records[p]))) {
            (Some(a), Some(b)) => Some(a - b),
            _ => None,
        };
        set(&mut records[cur], delta);
    }
}

/// Float flavor of [`diff_opt_i64`], used for the spot price column.
pub fn diff_opt_f64(
    records: &mut [DerivedRecord],
    index: &GroupIndex,
    get: fn(&DerivedRecord) -> Option<f64>,
    set: fn(&mut DerivedRecord, Option<f64>),
) {
    for (cur, prev) in index.pairs() {
        let delta = match (get(&records[cur]), prev.and_then(|p| get(&records[p]))) {
            (Some(a), Some(b)) => Some(a - b),
            _ => None,
        };
        set(&mut records[cur], delta);
    }
}

/// Fill every day-over-day integer metric.
pub fn apply(records: &mut [DerivedRecord], index: &GroupIndex) {
    // Option index: day change of the call/put absolute changes, then their
    // spread, then the day change of the spread.
    diff_i64(records, index, |r| r.abs_change_call, |r, v| {
        r.net_call_change = v
    });
    diff_i64(records, index, |r| r.abs_change_put, |r, v| {
        r.net_put_change = v
    });
    for rec in records.iter_mut() {
        rec.net_diff = match (rec.net_call_change, rec.net_put_change) {
            (Some(call), Some(put)) => Some(call - put),
            _ => None,
        };
    }
    diff_opt_i64(records, index, |r| r.net_diff, |r, v| r.option_roc = v);

    // Future index
    diff_i64(records, index, |r| r.future_net, |r, v| r.future_roc = v);
    diff_i64(records, index, |r| r.raw.future_index_long, |r, v| {
        r.future_abs_change_long = v
    });
    diff_i64(records, index, |r| r.raw.future_index_short, |r, v| {
        r.future_abs_change_short = v
    });

    // Future stock
    diff_i64(records, index, |r| r.stock_net, |r, v| r.stock_roc = v);
    diff_i64(records, index, |r| r.raw.future_stock_long, |r, v| {
        r.stock_abs_change_long = v
    });
    diff_i64(records, index, |r| r.raw.future_stock_short, |r, v| {
        r.stock_abs_change_short = v
    });
}
