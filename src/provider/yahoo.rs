//! Yahoo Finance spot price provider
//!
//! Pulls NIFTY 50 (`^NSEI`) daily closes from the public v8 chart API.
//! Timestamps on the wire are exchange-local epoch seconds, so they are
//! mapped back to trading dates through Asia/Kolkata.

use crate::error::{AppError, Result};
use crate::provider::{SpotProvider, SpotQuote};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone};
use chrono_tz::Asia::Kolkata;
use reqwest::Client;
use serde::Deserialize;

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const NIFTY_SYMBOL: &str = "%5ENSEI";

/// Days to look back when the requested date itself has no market data
const FALLBACK_DAYS: i64 = 5;

/// Yahoo Finance provider implementation
pub struct YahooProvider {
    client: Client,
}

impl YahooProvider {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .user_agent("Mozilla/5.0 (X11; Linux x86_64)")
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Midnight of `date` in the exchange timezone as epoch seconds
    fn epoch_at_midnight(date: NaiveDate) -> Result<i64> {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| AppError::Provider(format!("Invalid date {}", date)))?;
        let local = Kolkata
            .from_local_datetime(&midnight)
            .single()
            .ok_or_else(|| AppError::Provider(format!("Ambiguous local time for {}", date)))?;
        Ok(local.timestamp())
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    close: Option<Vec<Option<f64>>>,
}

/// Pick the latest close at or before `target` from parallel
/// timestamp/close arrays. Timestamps are epoch seconds; the session
/// date is their Asia/Kolkata calendar day.
fn select_close(timestamps: &[i64], closes: &[Option<f64>], target: NaiveDate) -> Option<SpotQuote> {
    let mut best: Option<SpotQuote> = None;

    for (ts, close) in timestamps.iter().zip(closes.iter()) {
        let price = match close {
            Some(p) => *p,
            None => continue,
        };
        let date = chrono::DateTime::from_timestamp(*ts, 0)?
            .with_timezone(&Kolkata)
            .date_naive();
        if date > target {
            continue;
        }
        if best.map_or(true, |b| date > b.date) {
            best = Some(SpotQuote {
                date,
                price: (price * 100.0).round() / 100.0,
            });
        }
    }

    best
}

#[async_trait]
impl SpotProvider for YahooProvider {
    fn id(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_close(&self, date: NaiveDate) -> Result<SpotQuote> {
        // Window covers the fallback range up front so a holiday does not
        // cost a second round trip.
        let period1 = Self::epoch_at_midnight(date - Duration::days(FALLBACK_DAYS))?;
        let period2 = Self::epoch_at_midnight(date + Duration::days(1))?;

        let url = format!(
            "{}/{}?period1={}&period2={}&interval=1d",
            BASE_URL, NIFTY_SYMBOL, period1, period2
        );

        tracing::info!("Fetching NIFTY close for {} from Yahoo Finance", date);

        let response = self.client.get(&url).send().await?;
        let result: ChartResponse = response.json().await?;

        if let Some(err) = result.chart.error {
            return Err(AppError::Provider(format!(
                "Yahoo Finance error {}: {}",
                err.code, err.description
            )));
        }

        let chart = result
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| AppError::Provider("Empty chart response".to_string()))?;

        let timestamps = chart.timestamp.unwrap_or_default();
        let closes = chart
            .indicators
            .quote
            .first()
            .and_then(|q| q.close.clone())
            .unwrap_or_default();

        select_close(&timestamps, &closes, date).ok_or_else(|| {
            AppError::Provider(format!(
                "No market data for {} or the {} days before it",
                date, FALLBACK_DAYS
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Epoch seconds for 09:15 IST on the given date
    fn session_ts(d: NaiveDate) -> i64 {
        Kolkata
            .from_local_datetime(&d.and_hms_opt(9, 15, 0).unwrap())
            .single()
            .unwrap()
            .timestamp()
    }

    #[test]
    fn test_select_close_exact_date() {
        let ts = vec![session_ts(date(2025, 12, 4)), session_ts(date(2025, 12, 5))];
        let closes = vec![Some(24_500.0), Some(24_675.456)];

        let quote = select_close(&ts, &closes, date(2025, 12, 5)).unwrap();
        assert_eq!(quote.date, date(2025, 12, 5));
        assert_eq!(quote.price, 24_675.46);
    }

    #[test]
    fn test_select_close_falls_back_to_earlier_session() {
        // Friday close only; Saturday requested.
        let ts = vec![session_ts(date(2025, 12, 5))];
        let closes = vec![Some(24_675.0)];

        let quote = select_close(&ts, &closes, date(2025, 12, 6)).unwrap();
        assert_eq!(quote.date, date(2025, 12, 5));
        assert_eq!(quote.price, 24_675.0);
    }

    #[test]
    fn test_select_close_skips_null_closes() {
        let ts = vec![session_ts(date(2025, 12, 4)), session_ts(date(2025, 12, 5))];
        let closes = vec![Some(24_500.0), None];

        let quote = select_close(&ts, &closes, date(2025, 12, 5)).unwrap();
        assert_eq!(quote.date, date(2025, 12, 4));
    }

    #[test]
    fn test_select_close_ignores_dates_past_target() {
        let ts = vec![session_ts(date(2025, 12, 5)), session_ts(date(2025, 12, 8))];
        let closes = vec![Some(24_675.0), Some(24_800.0)];

        let quote = select_close(&ts, &closes, date(2025, 12, 5)).unwrap();
        assert_eq!(quote.date, date(2025, 12, 5));
        assert_eq!(quote.price, 24_675.0);
    }

    #[test]
    fn test_select_close_empty_series() {
        assert!(select_close(&[], &[], date(2025, 12, 5)).is_none());
    }
}
