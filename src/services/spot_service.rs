//! Spot Service
//!
//! Stores NIFTY closing prices, either entered manually or pulled from a
//! provider. Prices merge into the derived table by trading date.

use crate::error::{AppError, Result};
use crate::provider::SpotProvider;
use crate::state::AppState;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

/// A stored spot price
#[derive(Debug, Clone, Serialize)]
pub struct SpotResult {
    /// Trading date the price is stored under
    pub date: NaiveDate,
    pub price: f64,
    pub source: String,
    /// Session the close actually came from, when a provider had to fall
    /// back to an earlier day
    pub close_date: Option<NaiveDate>,
}

/// Spot service for business logic
pub struct SpotService;

impl SpotService {
    /// Store a manually entered closing price
    pub fn set_manual(state: &AppState, date: NaiveDate, price: f64) -> Result<SpotResult> {
        info!("SpotService::set_manual - date={} price={}", date, price);

        if !price.is_finite() || price <= 0.0 {
            return Err(AppError::Validation(format!(
                "Spot price must be positive, got {}",
                price
            )));
        }

        state.db.upsert_spot(date, price, "manual")?;

        Ok(SpotResult {
            date,
            price,
            source: "manual".to_string(),
            close_date: None,
        })
    }

    /// Fetch the close for `date` from `provider` and store it under `date`.
    ///
    /// When the provider falls back to an earlier session the fetched price
    /// is still stored under the requested date, with the actual session
    /// reported in the result.
    pub async fn fetch(
        state: &AppState,
        provider: &dyn SpotProvider,
        date: NaiveDate,
    ) -> Result<SpotResult> {
        info!("SpotService::fetch - provider={} date={}", provider.id(), date);

        let quote = provider.fetch_close(date).await?;

        if quote.date != date {
            warn!(
                "No close for {}; using the {} close {:.2}",
                date, quote.date, quote.price
            );
        }

        state.db.upsert_spot(date, quote.price, provider.id())?;

        Ok(SpotResult {
            date,
            price: quote.price,
            source: provider.id().to_string(),
            close_date: Some(quote.date),
        })
    }
}
