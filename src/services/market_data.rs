//! Market-quote connector: daily closing prices for the tracked
//! instruments from a Yahoo Finance style chart API.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::Client;
use serde::Deserialize;

use crate::error::PipelineError;
use crate::services::indicators::pct_change;
use crate::services::series::DailyFrame;

/// Store column name -> provider ticker.
pub const INSTRUMENTS: [(&str, &str); 10] = [
    ("usd_krw", "KRW=X"),
    ("wti_price", "CL=F"),
    ("sp500_index", "^GSPC"),
    ("kospi_index", "^KS11"),
    ("usd_jpy", "JPY=X"),
    ("usd_cny", "CNY=X"),
    ("eur_usd", "EURUSD=X"),
    ("vix", "^VIX"),
    ("gold", "GC=F"),
    ("dxy", "DX-Y.NYB"),
];

/// Injectable market connector so tests can run without network access.
#[async_trait]
pub trait MarketFetcher: Send + Sync {
    /// Daily closes for every reachable instrument, merged on date and
    /// gap-filled. An empty frame means the whole connector failed.
    async fn fetch_daily(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailyFrame, PipelineError>;
}

#[derive(Clone)]
pub struct YahooFinanceService {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    close: Vec<Option<f64>>,
}

impl YahooFinanceService {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// One chart request for one ticker. Errors here are per-instrument
    /// and handled by the caller.
    async fn fetch_close_series(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, PipelineError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        let period1 = start.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();
        let period2 = end.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();

        let response = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::Provider(format!(
                "chart API error {} for {}: {}",
                status, ticker, error_text
            )));
        }

        let data: ChartResponse = response.json().await?;

        if let Some(err) = data.chart.error {
            return Err(PipelineError::Provider(format!(
                "chart API rejected {}: {}",
                ticker, err
            )));
        }

        let result = data
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| {
                PipelineError::Provider(format!("chart API returned no result for {}", ticker))
            })?;

        let timestamps = result.timestamp.unwrap_or_default();
        let closes = result
            .indicators
            .quote
            .first()
            .map(|q| q.close.clone())
            .unwrap_or_default();

        let mut points = Vec::with_capacity(timestamps.len());
        for (ts, close) in timestamps.iter().zip(closes) {
            let Some(close) = close else { continue };
            let Some(dt) = DateTime::from_timestamp(*ts, 0) else {
                continue;
            };
            points.push((dt.date_naive(), close));
        }
        // The provider stamps rows at session open; keep the first
        // close when two rows land on the same calendar day.
        points.dedup_by_key(|(date, _)| *date);

        Ok(points)
    }
}

#[async_trait]
impl MarketFetcher for YahooFinanceService {
    async fn fetch_daily(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailyFrame, PipelineError> {
        tracing::info!("Fetching market data for {} .. {}", start, end);

        let mut series = Vec::new();
        for (column, ticker) in INSTRUMENTS {
            match self.fetch_close_series(ticker, start, end).await {
                Ok(points) if points.is_empty() => {
                    tracing::warn!("No data for {} ({}), column skipped", column, ticker);
                }
                Ok(points) => {
                    tracing::info!("Fetched {} closes for {} ({})", points.len(), column, ticker);
                    series.push((column.to_string(), points));
                }
                Err(e) => {
                    tracing::warn!("Failed to fetch {} ({}): {}", column, ticker, e);
                }
            }
        }

        if series.is_empty() {
            return Ok(DailyFrame::new());
        }

        let mut frame = DailyFrame::from_series(series);
        frame.drop_rows_all_null();
        frame.interpolate_linear();
        frame.forward_fill();
        frame.backward_fill();

        attach_kospi_volatility(&mut frame);

        Ok(frame)
    }
}

/// Percent-magnitude daily volatility of the KOSPI level. Undefined
/// cells (first row, zero denominator) become 0.
pub fn attach_kospi_volatility(frame: &mut DailyFrame) {
    let Some(kospi) = frame.column("kospi_index") else {
        return;
    };
    let vol: Vec<Option<f64>> = pct_change(kospi)
        .into_iter()
        .map(|p| Some(p.map(|v| v.abs() * 100.0).unwrap_or(0.0)))
        .collect();
    frame.push_column("kospi_volatility", vol);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn kospi_volatility_is_absolute_percent_change() {
        let mut frame = DailyFrame::from_series(vec![(
            "kospi_index".to_string(),
            vec![(d(1), 2000.0), (d(2), 2020.0), (d(3), 1999.8)],
        )]);
        attach_kospi_volatility(&mut frame);

        let vol = frame.column("kospi_volatility").unwrap();
        assert_eq!(vol[0], Some(0.0)); // no prior day
        assert!((vol[1].unwrap() - 1.0).abs() < 1e-12);
        assert!((vol[2].unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn kospi_volatility_zero_level_maps_to_zero() {
        let mut frame = DailyFrame::from_series(vec![(
            "kospi_index".to_string(),
            vec![(d(1), 0.0), (d(2), 100.0)],
        )]);
        attach_kospi_volatility(&mut frame);

        // division by zero must not produce an infinity
        assert_eq!(frame.column("kospi_volatility").unwrap()[1], Some(0.0));
    }
}
