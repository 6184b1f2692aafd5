//! Incremental update cycle for the macro_data primary store.
//!
//! Each run reads the watermark (max stored date), derives the fetch
//! window, pulls both connectors, integrates, and upserts the result
//! inside one transaction. A window that collapses to zero days is a
//! successful no-op.

use chrono::{Duration, NaiveDate, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryOrder, Set, TransactionTrait,
};

use crate::config::PipelineConfig;
use crate::entities::{macro_data, prelude::*};
use crate::error::PipelineError;
use crate::services::fred::RateFetcher;
use crate::services::integrator::integrate;
use crate::services::market_data::MarketFetcher;
use crate::services::series::DailyFrame;

/// Outcome of one ingest run, surfaced to the caller.
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// True when the watermark was already current and nothing ran
    pub no_op: bool,
    /// Fetch window used, when one existed
    pub window: Option<(NaiveDate, NaiveDate)>,
    /// Rows inserted or overwritten this run
    pub rows_upserted: usize,
    /// Final table state after the run
    pub total_rows: u64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// One incremental update cycle, with "today" taken from the clock.
pub async fn run_ingest(
    db: &DatabaseConnection,
    market: &dyn MarketFetcher,
    rates: &dyn RateFetcher,
    config: &PipelineConfig,
) -> Result<IngestReport, PipelineError> {
    run_ingest_as_of(db, market, rates, config, Utc::now().date_naive()).await
}

/// The same cycle with an explicit "today", so runs are reproducible
/// under test.
pub async fn run_ingest_as_of(
    db: &DatabaseConnection,
    market: &dyn MarketFetcher,
    rates: &dyn RateFetcher,
    config: &PipelineConfig,
    today: NaiveDate,
) -> Result<IngestReport, PipelineError> {
    let watermark = stored_watermark(db).await?;

    let Some((start, end)) = fetch_window(watermark, today, config.initial_lookback_years) else {
        tracing::info!(
            "Store already current (watermark: {:?}), nothing to fetch",
            watermark
        );
        return finish_report(db, true, None, 0).await;
    };

    match watermark {
        Some(mark) => tracing::info!(
            "Incremental update: watermark {}, fetching {} .. {}",
            mark,
            start,
            end
        ),
        None => tracing::info!(
            "First run: backfilling {} years, fetching {} .. {}",
            config.initial_lookback_years,
            start,
            end
        ),
    }

    let market_frame = market.fetch_daily(start, end).await?;
    let rate_frame = rates.fetch_daily(start, end).await?;
    let merged = integrate(market_frame, rate_frame, start, end)?;

    if merged.is_empty() {
        tracing::warn!("No new rows survived integration for {} .. {}", start, end);
        return finish_report(db, false, Some((start, end)), 0).await;
    }

    let rows_upserted = upsert_observations(db, &merged).await?;
    tracing::info!("Upserted {} rows into macro_data", rows_upserted);

    finish_report(db, false, Some((start, end)), rows_upserted).await
}

/// Most recent date already present in the store.
pub async fn stored_watermark(
    db: &DatabaseConnection,
) -> Result<Option<NaiveDate>, PipelineError> {
    let last = MacroData::find()
        .order_by(macro_data::Column::Date, Order::Desc)
        .one(db)
        .await?;
    Ok(last.map(|row| row.date))
}

/// Fetch window for this run. `None` means the store is already
/// current. First run (no watermark) backfills `lookback_years` ending
/// today; otherwise the window starts the day after the watermark.
pub fn fetch_window(
    watermark: Option<NaiveDate>,
    today: NaiveDate,
    lookback_years: i64,
) -> Option<(NaiveDate, NaiveDate)> {
    match watermark {
        None => Some((today - Duration::days(lookback_years * 365), today)),
        Some(mark) => {
            let start = mark + Duration::days(1);
            if start >= today {
                None
            } else {
                Some((start, today))
            }
        }
    }
}

/// Upsert every frame row keyed by date, atomically. On conflict all
/// value fields are overwritten and `updated_at` bumped; `created_at`
/// keeps its original value.
async fn upsert_observations(
    db: &DatabaseConnection,
    frame: &DailyFrame,
) -> Result<usize, PipelineError> {
    let now = Utc::now().naive_utc();

    let mut models = Vec::with_capacity(frame.len());
    for row in 0..frame.len() {
        models.push(row_to_model(frame, row, now)?);
    }
    let row_count = models.len();

    // Chunked to stay under backend bind-parameter limits; the whole
    // batch still commits or rolls back as one unit.
    let txn = db.begin().await?;
    for chunk in models.chunks(500) {
        MacroData::insert_many(chunk.to_vec())
            .on_conflict(
                OnConflict::column(macro_data::Column::Date)
                    .update_columns([
                        macro_data::Column::UsdKrw,
                        macro_data::Column::WtiPrice,
                        macro_data::Column::Sp500Index,
                        macro_data::Column::KospiIndex,
                        macro_data::Column::KospiVolatility,
                        macro_data::Column::UsdJpy,
                        macro_data::Column::UsdCny,
                        macro_data::Column::EurUsd,
                        macro_data::Column::Vix,
                        macro_data::Column::Gold,
                        macro_data::Column::Dxy,
                        macro_data::Column::UsRate,
                        macro_data::Column::KrRate,
                        macro_data::Column::Ird,
                        macro_data::Column::UstSpread,
                        macro_data::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&txn)
            .await?;
    }
    txn.commit().await?;

    Ok(row_count)
}

fn row_to_model(
    frame: &DailyFrame,
    row: usize,
    now: chrono::NaiveDateTime,
) -> Result<macro_data::ActiveModel, PipelineError> {
    let date = frame.dates()[row];
    let cell = |column: &'static str| {
        frame.get(column, row).ok_or_else(|| {
            PipelineError::Provider(format!("null {} after integration on {}", column, date))
        })
    };

    Ok(macro_data::ActiveModel {
        date: Set(date),
        usd_krw: Set(cell("usd_krw")?),
        wti_price: Set(cell("wti_price")?),
        sp500_index: Set(cell("sp500_index")?),
        kospi_index: Set(cell("kospi_index")?),
        kospi_volatility: Set(cell("kospi_volatility")?),
        usd_jpy: Set(cell("usd_jpy")?),
        usd_cny: Set(cell("usd_cny")?),
        eur_usd: Set(cell("eur_usd")?),
        vix: Set(cell("vix")?),
        gold: Set(cell("gold")?),
        dxy: Set(cell("dxy")?),
        us_rate: Set(cell("us_rate")?),
        kr_rate: Set(cell("kr_rate")?),
        ird: Set(cell("ird")?),
        ust_spread: Set(cell("ust_spread")?),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
    })
}

async fn finish_report(
    db: &DatabaseConnection,
    no_op: bool,
    window: Option<(NaiveDate, NaiveDate)>,
    rows_upserted: usize,
) -> Result<IngestReport, PipelineError> {
    let total_rows = MacroData::find().count(db).await?;
    let first_date = MacroData::find()
        .order_by(macro_data::Column::Date, Order::Asc)
        .one(db)
        .await?
        .map(|row| row.date);
    let last_date = MacroData::find()
        .order_by(macro_data::Column::Date, Order::Desc)
        .one(db)
        .await?
        .map(|row| row.date);

    Ok(IngestReport {
        no_op,
        window,
        rows_upserted,
        total_rows,
        first_date,
        last_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_run_backfills_the_long_lookback() {
        let today = date(2026, 8, 30);
        let (start, end) = fetch_window(None, today, 15).unwrap();
        assert_eq!(end, today);
        assert_eq!(start, today - Duration::days(15 * 365));
    }

    #[test]
    fn incremental_window_starts_after_watermark() {
        let today = date(2026, 8, 30);
        let (start, end) = fetch_window(Some(date(2026, 8, 20)), today, 15).unwrap();
        assert_eq!(start, date(2026, 8, 21));
        assert_eq!(end, today);
    }

    #[test]
    fn watermark_at_yesterday_or_later_is_a_no_op() {
        let today = date(2026, 8, 30);
        assert!(fetch_window(Some(date(2026, 8, 29)), today, 15).is_none());
        assert!(fetch_window(Some(today), today, 15).is_none());
        assert!(fetch_window(Some(date(2026, 9, 5)), today, 15).is_none());
    }
}
