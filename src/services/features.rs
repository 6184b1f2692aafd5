//! Full rebuild of the macro_features derived table.
//!
//! Reads the primary store ascending, closes numeric gaps, derives the
//! technical indicators and the forward log-return label, drops every
//! row that is missing any derived value (warm-up at the start, label
//! horizon at the end) and replaces the table contents in one
//! transaction.

use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, EntityTrait, Order, QueryOrder, Set, TransactionTrait};

use crate::config::PipelineConfig;
use crate::entities::{macro_data, macro_features, prelude::*};
use crate::error::PipelineError;
use crate::services::indicators::{
    forward_log_return, macd, pct_change, rolling_std, rsi, sma,
};
use crate::services::series::DailyFrame;

/// Covariates that feed the model as day-over-day changes rather than
/// levels.
pub const PCT_CHANGE_COLUMNS: [&str; 5] =
    ["wti_price", "sp500_index", "kospi_index", "gold", "dxy"];

/// Outcome of one feature build run.
#[derive(Debug, Clone)]
pub struct FeatureBuildReport {
    /// Rows read from macro_data
    pub source_rows: usize,
    /// Rows written to macro_features (0 when history is too short)
    pub rows_written: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// One full rebuild of the derived table.
pub async fn run_feature_build(
    db: &DatabaseConnection,
    config: &PipelineConfig,
) -> Result<FeatureBuildReport, PipelineError> {
    let observations = MacroData::find()
        .order_by(macro_data::Column::Date, Order::Asc)
        .all(db)
        .await?;
    let source_rows = observations.len();
    tracing::info!("Loaded {} observation rows for feature build", source_rows);

    let frame = observations_to_frame(&observations);
    let rows = derive_features(frame, config);

    if rows.is_empty() {
        tracing::warn!(
            "Insufficient history for features: {} rows stored, {} needed",
            source_rows,
            config.min_feature_history()
        );
    }

    let first_date = rows.first().map(|r| r.date);
    let last_date = rows.last().map(|r| r.date);
    let rows_written = rows.len();

    // Replace-all semantics: the derived table is fully owned by this
    // builder and rebuilt from scratch on every run.
    let txn = db.begin().await?;
    MacroFeatures::delete_many().exec(&txn).await?;
    // Chunked to stay under backend bind-parameter limits
    for chunk in rows.chunks(500) {
        MacroFeatures::insert_many(chunk.iter().cloned().map(to_active))
            .exec(&txn)
            .await?;
    }
    txn.commit().await?;

    tracing::info!("Rebuilt macro_features with {} rows", rows_written);

    Ok(FeatureBuildReport {
        source_rows,
        rows_written,
        first_date,
        last_date,
    })
}

/// Primary-store rows as a date-indexed frame, one column per numeric
/// field.
pub fn observations_to_frame(rows: &[macro_data::Model]) -> DailyFrame {
    let columns: [(&str, fn(&macro_data::Model) -> f64); 15] = [
        ("usd_krw", |m| m.usd_krw),
        ("wti_price", |m| m.wti_price),
        ("sp500_index", |m| m.sp500_index),
        ("kospi_index", |m| m.kospi_index),
        ("kospi_volatility", |m| m.kospi_volatility),
        ("usd_jpy", |m| m.usd_jpy),
        ("usd_cny", |m| m.usd_cny),
        ("eur_usd", |m| m.eur_usd),
        ("vix", |m| m.vix),
        ("gold", |m| m.gold),
        ("dxy", |m| m.dxy),
        ("us_rate", |m| m.us_rate),
        ("kr_rate", |m| m.kr_rate),
        ("ird", |m| m.ird),
        ("ust_spread", |m| m.ust_spread),
    ];

    DailyFrame::from_series(
        columns
            .into_iter()
            .map(|(name, get)| {
                (
                    name.to_string(),
                    rows.iter().map(|m| (m.date, get(m))).collect(),
                )
            })
            .collect(),
    )
}

/// Derive indicator columns, percentage changes and the label from a
/// gap-free ascending frame of raw observations. Rows whose windows or
/// label cannot be fully computed are dropped.
pub fn derive_features(mut frame: DailyFrame, config: &PipelineConfig) -> Vec<macro_features::Model> {
    frame.interpolate_linear();
    frame.drop_rows_any_null();
    if frame.is_empty() {
        return Vec::new();
    }

    let target: Vec<f64> = frame
        .column("usd_krw")
        .map(|col| col.iter().map(|v| v.unwrap()).collect())
        .unwrap_or_default();

    let ma_short = sma(&target, config.ma_short_window);
    let ma_long = sma(&target, config.ma_long_window);
    let macd_line = macd(&target, config.macd_fast_span, config.macd_slow_span);
    let rsi_line = rsi(&target, config.rsi_window);
    let bb_mid = sma(&target, config.bollinger_window);
    let bb_std = rolling_std(&target, config.bollinger_window);
    let label = forward_log_return(&target, config.forecast_horizon);

    let changes: Vec<Vec<Option<f64>>> = PCT_CHANGE_COLUMNS
        .iter()
        .map(|col| pct_change(frame.column(col).unwrap_or(&[])))
        .collect();

    let mut rows = Vec::new();
    for i in 0..frame.len() {
        let derived = (|| {
            let ma7 = ma_short[i]?;
            let ma60 = ma_long[i]?;
            let rsi = rsi_line[i]?;
            let bb_mid = bb_mid[i]?;
            let bb_std = bb_std[i]?;
            let target_return = label[i]?;
            let chg: Vec<f64> = changes
                .iter()
                .map(|c| c[i])
                .collect::<Option<Vec<f64>>>()?;
            Some((ma7, ma60, rsi, bb_mid, bb_std, target_return, chg))
        })();

        let Some((ma7, ma60, rsi, bb_mid, bb_std, target_return, chg)) = derived else {
            continue;
        };

        let cell = |name: &str| frame.get(name, i).unwrap_or_default();
        rows.push(macro_features::Model {
            date: frame.dates()[i],
            usd_krw: target[i],
            wti_price: cell("wti_price"),
            sp500_index: cell("sp500_index"),
            kospi_index: cell("kospi_index"),
            kospi_volatility: cell("kospi_volatility"),
            usd_jpy: cell("usd_jpy"),
            usd_cny: cell("usd_cny"),
            eur_usd: cell("eur_usd"),
            vix: cell("vix"),
            gold: cell("gold"),
            dxy: cell("dxy"),
            us_rate: cell("us_rate"),
            kr_rate: cell("kr_rate"),
            ird: cell("ird"),
            ust_spread: cell("ust_spread"),
            ma7,
            ma60,
            macd: macd_line[i],
            rsi,
            bb_mid,
            bb_std,
            bb_upper: bb_mid + 2.0 * bb_std,
            bb_lower: bb_mid - 2.0 * bb_std,
            wti_price_chg: chg[0],
            sp500_index_chg: chg[1],
            kospi_index_chg: chg[2],
            gold_chg: chg[3],
            dxy_chg: chg[4],
            target_return,
        });
    }

    rows
}

fn to_active(row: macro_features::Model) -> macro_features::ActiveModel {
    macro_features::ActiveModel {
        date: Set(row.date),
        usd_krw: Set(row.usd_krw),
        wti_price: Set(row.wti_price),
        sp500_index: Set(row.sp500_index),
        kospi_index: Set(row.kospi_index),
        kospi_volatility: Set(row.kospi_volatility),
        usd_jpy: Set(row.usd_jpy),
        usd_cny: Set(row.usd_cny),
        eur_usd: Set(row.eur_usd),
        vix: Set(row.vix),
        gold: Set(row.gold),
        dxy: Set(row.dxy),
        us_rate: Set(row.us_rate),
        kr_rate: Set(row.kr_rate),
        ird: Set(row.ird),
        ust_spread: Set(row.ust_spread),
        ma7: Set(row.ma7),
        ma60: Set(row.ma60),
        macd: Set(row.macd),
        rsi: Set(row.rsi),
        bb_mid: Set(row.bb_mid),
        bb_std: Set(row.bb_std),
        bb_upper: Set(row.bb_upper),
        bb_lower: Set(row.bb_lower),
        wti_price_chg: Set(row.wti_price_chg),
        sp500_index_chg: Set(row.sp500_index_chg),
        kospi_index_chg: Set(row.kospi_index_chg),
        gold_chg: Set(row.gold_chg),
        dxy_chg: Set(row.dxy_chg),
        target_return: Set(row.target_return),
    }
}
