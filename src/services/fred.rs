//! Macro-rate connector: policy rates and the yield-curve spread from a
//! FRED style observations API.
//!
//! The three series come at different native frequencies (FEDFUNDS and
//! the Korean long-term rate are monthly, the 10Y-2Y spread is daily),
//! so the merged frame is re-indexed onto every calendar day in the
//! window and forward/backward filled into a dense daily series.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

use crate::error::PipelineError;
use crate::services::series::DailyFrame;

/// Store column name -> provider series id.
pub const RATE_SERIES: [(&str, &str); 3] = [
    ("us_rate", "FEDFUNDS"),
    ("kr_rate", "IRLTLT01KRM156N"),
    ("ust_spread", "T10Y2Y"),
];

/// Injectable rate connector so tests can run without network access.
#[async_trait]
pub trait RateFetcher: Send + Sync {
    /// Dense daily frame of the three rate series over the window.
    /// An empty frame means the whole connector failed.
    async fn fetch_daily(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailyFrame, PipelineError>;
}

#[derive(Clone)]
pub struct FredService {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

impl FredService {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    async fn fetch_series(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, PipelineError> {
        let url = format!("{}/fred/series/observations", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("series_id", series_id),
                ("api_key", &self.api_key),
                ("file_type", "json"),
                ("observation_start", &start.format("%Y-%m-%d").to_string()),
                ("observation_end", &end.format("%Y-%m-%d").to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::Provider(format!(
                "FRED API error {} for {}: {}",
                status, series_id, error_text
            )));
        }

        let data: ObservationsResponse = response.json().await?;

        let mut points = Vec::with_capacity(data.observations.len());
        for obs in data.observations {
            // "." marks a missing observation
            if obs.value == "." {
                continue;
            }
            let Ok(date) = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d") else {
                tracing::warn!("Unparseable date '{}' in series {}", obs.date, series_id);
                continue;
            };
            let Ok(value) = obs.value.parse::<f64>() else {
                tracing::warn!(
                    "Unparseable value '{}' on {} in series {}",
                    obs.value,
                    obs.date,
                    series_id
                );
                continue;
            };
            points.push((date, value));
        }

        Ok(points)
    }
}

#[async_trait]
impl RateFetcher for FredService {
    async fn fetch_daily(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailyFrame, PipelineError> {
        tracing::info!("Fetching rate data for {} .. {}", start, end);

        let mut series = Vec::new();
        for (column, series_id) in RATE_SERIES {
            let points = self.fetch_series(series_id, start, end).await?;
            tracing::info!(
                "Fetched {} observations for {} ({})",
                points.len(),
                column,
                series_id
            );
            series.push((column.to_string(), points));
        }

        if series.iter().all(|(_, points)| points.is_empty()) {
            return Ok(DailyFrame::new());
        }

        let mut frame = DailyFrame::from_series(series);
        frame.drop_rows_all_null();
        frame = frame.reindex_daily(start, end);
        frame.forward_fill();
        frame.backward_fill();

        Ok(frame)
    }
}
