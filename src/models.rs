//! Core data model: raw participant records and derived metrics

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Participant category as published by the exchange.
///
/// Declaration order matches the alphabetical order of the exchange labels,
/// which is the canonical within-date ordering of the output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClientType {
    Client,
    Dii,
    Fii,
    Pro,
    Total,
}

impl ClientType {
    /// All categories in canonical order.
    pub const ALL: [ClientType; 5] = [
        ClientType::Client,
        ClientType::Dii,
        ClientType::Fii,
        ClientType::Pro,
        ClientType::Total,
    ];

    /// Exchange label for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientType::Client => "Client",
            ClientType::Dii => "DII",
            ClientType::Fii => "FII",
            ClientType::Pro => "Pro",
            ClientType::Total => "TOTAL",
        }
    }

    /// Parse an exchange label, tolerating case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<ClientType> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CLIENT" => Some(ClientType::Client),
            "DII" => Some(ClientType::Dii),
            "FII" => Some(ClientType::Fii),
            "PRO" => Some(ClientType::Pro),
            "TOTAL" => Some(ClientType::Total),
            _ => None,
        }
    }
}

impl std::fmt::Display for ClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One raw row of the exchange's participant-wise open interest file.
/// All contract counts are end-of-day open interest, not turnover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenInterestRecord {
    pub date: NaiveDate,
    pub client_type: ClientType,
    pub future_index_long: i64,
    pub future_index_short: i64,
    pub future_stock_long: i64,
    pub future_stock_short: i64,
    pub option_index_call_long: i64,
    pub option_index_put_long: i64,
    pub option_index_call_short: i64,
    pub option_index_put_short: i64,
    pub option_stock_call_long: i64,
    pub option_stock_put_long: i64,
    pub option_stock_call_short: i64,
    pub option_stock_put_short: i64,
    pub total_long_contracts: i64,
    pub total_short_contracts: i64,
}

/// A raw record annotated with the full derived metric set.
///
/// Day-over-day fields are `None` on the earliest record of a client-type
/// group; ratio and percentage fields are `None` when their denominator is
/// zero or missing. Percentage-class fields hold fractions and are scaled
/// to percent at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRecord {
    pub raw: OpenInterestRecord,

    // Option index
    pub abs_change_call: i64,
    pub abs_change_put: i64,
    pub option_net: i64,
    pub net_call_change: Option<i64>,
    pub net_put_change: Option<i64>,
    pub net_diff: Option<i64>,
    pub option_roc: Option<i64>,

    // Future index
    pub future_net: i64,
    pub future_roc: Option<i64>,
    pub future_abs_change_long: Option<i64>,
    pub future_abs_change_short: Option<i64>,
    pub future_ls_ratio: Option<f64>,
    pub future_long_pct: Option<f64>,
    pub future_short_pct: Option<f64>,

    // Future stock
    pub stock_net: i64,
    pub stock_roc: Option<i64>,
    pub stock_abs_change_long: Option<i64>,
    pub stock_abs_change_short: Option<i64>,
    pub stock_ls_ratio: Option<f64>,
    pub stock_long_pct: Option<f64>,
    pub stock_short_pct: Option<f64>,

    // Index spot
    pub nifty_spot: Option<f64>,
    pub nifty_diff: Option<f64>,

    // Share of the date's futures open interest
    pub future_total_long_pct: Option<f64>,
    pub future_total_short_pct: Option<f64>,
}

impl DerivedRecord {
    /// Seed a derived record with the per-record metrics that never depend
    /// on other rows. Cross-row fields start as `None`.
    pub fn from_raw(raw: OpenInterestRecord) -> Self {
        let abs_change_call = raw.option_index_call_long - raw.option_index_call_short;
        let abs_change_put = raw.option_index_put_long - raw.option_index_put_short;
        let option_net = (raw.option_index_call_long + raw.option_index_put_short)
            - (raw.option_index_put_long + raw.option_index_call_short);
        let future_net = raw.future_index_long - raw.future_index_short;
        let stock_net = raw.future_stock_long - raw.future_stock_short;

        DerivedRecord {
            raw,
            abs_change_call,
            abs_change_put,
            option_net,
            net_call_change: None,
            net_put_change: None,
            net_diff: None,
            option_roc: None,
            future_net,
            future_roc: None,
            future_abs_change_long: None,
            future_abs_change_short: None,
            future_ls_ratio: None,
            future_long_pct: None,
            future_short_pct: None,
            stock_net,
            stock_roc: None,
            stock_abs_change_long: None,
            stock_abs_change_short: None,
            stock_ls_ratio: None,
            stock_long_pct: None,
            stock_short_pct: None,
            nifty_spot: None,
            nifty_diff: None,
            future_total_long_pct: None,
            future_total_short_pct: None,
        }
    }
}

/// Index spot closes keyed by trading date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexSpotSeries {
    prices: BTreeMap<NaiveDate, f64>,
}

impl IndexSpotSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: NaiveDate, price: f64) {
        self.prices.insert(date, price);
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.prices.get(&date).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.prices.iter().map(|(d, p)| (*d, *p))
    }
}

impl FromIterator<(NaiveDate, f64)> for IndexSpotSeries {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        IndexSpotSeries {
            prices: iter.into_iter().collect(),
        }
    }
}

/// A date missing one or more participant categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralGap {
    pub date: NaiveDate,
    pub missing: Vec<ClientType>,
}

impl std::fmt::Display for StructuralGap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let labels: Vec<&str> = self.missing.iter().map(|c| c.as_str()).collect();
        write!(f, "{}: missing {}", self.date, labels.join(", "))
    }
}

/// Engine output: annotated records in canonical order plus any structural
/// gaps found during normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedTable {
    pub records: Vec<DerivedRecord>,
    pub gaps: Vec<StructuralGap>,
}

impl DerivedTable {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
impl OpenInterestRecord {
    /// All-zero record for building test fixtures.
    pub(crate) fn zeroed(date: NaiveDate, client_type: ClientType) -> Self {
        OpenInterestRecord {
            date,
            client_type,
            future_index_long: 0,
            future_index_short: 0,
            future_stock_long: 0,
            future_stock_short: 0,
            option_index_call_long: 0,
            option_index_put_long: 0,
            option_index_call_short: 0,
            option_index_put_short: 0,
            option_stock_call_long: 0,
            option_stock_put_long: 0,
            option_stock_call_short: 0,
            option_stock_put_short: 0,
            total_long_contracts: 0,
            total_short_contracts: 0,
        }
    }
}
