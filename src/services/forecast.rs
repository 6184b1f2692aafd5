//! Input contract for the external forecast model.
//!
//! The downstream consumer is a sequence regressor (a two-stack
//! bidirectional LSTM in the reference deployment) that takes a
//! fixed-length window of consecutive feature rows and predicts the
//! forward log-return of the row following the window. This module is
//! the pipeline's half of that contract: gap-free, chronologically
//! ordered, fully numeric windows in a fixed column order. Training,
//! splitting and inference live outside this crate.

use crate::entities::macro_features;

/// Window length the reference model trains with.
pub const DEFAULT_TIME_STEPS: usize = 30;

/// Features per row fed to the model (raw fields, indicators and
/// percentage changes; the label is not an input).
pub const FEATURES_PER_ROW: usize = 28;

/// One training/inference sample: `time_steps` rows of features and
/// the label of the row that follows the window.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastWindow {
    /// `time_steps` rows, `FEATURES_PER_ROW` values each
    pub features: Vec<Vec<f64>>,
    /// target_return of the row after the window
    pub label: f64,
}

/// Feature vector of one row, in the fixed order the model expects.
pub fn feature_vector(row: &macro_features::Model) -> Vec<f64> {
    vec![
        row.usd_krw,
        row.wti_price,
        row.sp500_index,
        row.kospi_index,
        row.kospi_volatility,
        row.usd_jpy,
        row.usd_cny,
        row.eur_usd,
        row.vix,
        row.gold,
        row.dxy,
        row.us_rate,
        row.kr_rate,
        row.ird,
        row.ust_spread,
        row.ma7,
        row.ma60,
        row.macd,
        row.rsi,
        row.bb_mid,
        row.bb_std,
        row.bb_upper,
        row.bb_lower,
        row.wti_price_chg,
        row.sp500_index_chg,
        row.kospi_index_chg,
        row.gold_chg,
        row.dxy_chg,
    ]
}

/// Slide a `time_steps`-row window over chronologically ascending
/// feature rows. Each window is paired with the label of the row
/// following it, so `rows.len() - time_steps` windows come out of
/// `rows.len()` rows (none when there are not enough).
pub fn assemble_windows(rows: &[macro_features::Model], time_steps: usize) -> Vec<ForecastWindow> {
    if time_steps == 0 || rows.len() <= time_steps {
        return Vec::new();
    }

    (0..rows.len() - time_steps)
        .map(|i| ForecastWindow {
            features: rows[i..i + time_steps].iter().map(feature_vector).collect(),
            label: rows[i + time_steps].target_return,
        })
        .collect()
}
