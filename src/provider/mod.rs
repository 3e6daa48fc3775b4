//! Index spot price providers

pub mod yahoo;

use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// A closing price resolved for a trading date.
///
/// `date` is the session the close actually belongs to, which may be an
/// earlier trading day than the one requested when the requested date had
/// no market data (holiday, weekend, data not yet published).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotQuote {
    pub date: NaiveDate,
    pub price: f64,
}

/// Source of index closing prices
#[async_trait]
pub trait SpotProvider: Send + Sync {
    /// Provider ID (e.g., "yahoo")
    fn id(&self) -> &'static str;

    /// Fetch the index close for `date`, falling back to the nearest
    /// earlier session when the date itself has no data
    async fn fetch_close(&self, date: NaiveDate) -> Result<SpotQuote>;
}
