use std::env;

use crate::error::PipelineError;

/// Explicit configuration handed to each component at construction.
/// Connection settings come from the environment (the bins call
/// `dotenvy::dotenv()` first); indicator windows and the forecast
/// horizon carry their defaults here so the two jobs agree on them.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub database_url: String,
    pub fred_api_key: String,
    pub fred_base_url: String,
    pub yahoo_base_url: String,
    /// First-run backfill depth, in years
    pub initial_lookback_years: i64,
    /// Short / long simple moving average windows on the target
    pub ma_short_window: usize,
    pub ma_long_window: usize,
    /// MACD fast / slow EWMA spans
    pub macd_fast_span: usize,
    pub macd_slow_span: usize,
    pub rsi_window: usize,
    pub bollinger_window: usize,
    /// Days ahead the target_return label looks
    pub forecast_horizon: usize,
}

impl PipelineConfig {
    /// Build a config from the environment. `DATABASE_URL` and
    /// `FRED_API_KEY` are required; everything else has a default.
    pub fn from_env() -> Result<Self, PipelineError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| PipelineError::Config("DATABASE_URL"))?;
        let fred_api_key =
            env::var("FRED_API_KEY").map_err(|_| PipelineError::Config("FRED_API_KEY"))?;
        let fred_base_url = env::var("FRED_BASE_URL")
            .unwrap_or_else(|_| "https://api.stlouisfed.org".to_string());
        let yahoo_base_url = env::var("YAHOO_BASE_URL")
            .unwrap_or_else(|_| "https://query1.finance.yahoo.com".to_string());
        let initial_lookback_years = env::var("INITIAL_LOOKBACK_YEARS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(15);

        Ok(Self {
            database_url,
            fred_api_key,
            fred_base_url,
            yahoo_base_url,
            initial_lookback_years,
            ..Self::offline_defaults()
        })
    }

    /// Defaults for everything that does not touch the environment.
    /// Used by `from_env` and by tests that never open a connection.
    pub fn offline_defaults() -> Self {
        Self {
            database_url: String::new(),
            fred_api_key: String::new(),
            fred_base_url: String::new(),
            yahoo_base_url: String::new(),
            initial_lookback_years: 15,
            ma_short_window: 7,
            ma_long_window: 60,
            macd_fast_span: 12,
            macd_slow_span: 26,
            rsi_window: 14,
            bollinger_window: 20,
            forecast_horizon: 7,
        }
    }

    /// Longest trailing history any derived field needs before a row
    /// can survive the feature build (label horizon included).
    pub fn min_feature_history(&self) -> usize {
        let max_window = self
            .ma_long_window
            .max(self.macd_slow_span)
            .max(self.rsi_window + 1)
            .max(self.bollinger_window);
        max_window + self.forecast_horizon
    }
}
