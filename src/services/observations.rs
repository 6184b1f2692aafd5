//! Read contract over the two tables: pure reads, parameterized
//! filters, rows returned already sorted per the requested order.

use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect,
};

use crate::entities::{macro_data, macro_features, prelude::*};
use crate::error::PipelineError;

/// Optional date bounds, row cap and ordering for a load.
#[derive(Debug, Clone)]
pub struct LoadQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub limit: Option<u64>,
    /// True: newest first (descending); false: oldest first
    pub recent: bool,
}

impl Default for LoadQuery {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            limit: None,
            recent: true,
        }
    }
}

/// Load primary-store rows per the query.
pub async fn load_observations(
    db: &DatabaseConnection,
    query: &LoadQuery,
) -> Result<Vec<macro_data::Model>, PipelineError> {
    let mut find = MacroData::find();
    if let Some(start) = query.start {
        find = find.filter(macro_data::Column::Date.gte(start));
    }
    if let Some(end) = query.end {
        find = find.filter(macro_data::Column::Date.lte(end));
    }
    let order = if query.recent { Order::Desc } else { Order::Asc };
    find = find.order_by(macro_data::Column::Date, order);
    if let Some(limit) = query.limit {
        find = find.limit(limit);
    }

    Ok(find.all(db).await?)
}

/// Load derived feature rows per the query.
pub async fn load_features(
    db: &DatabaseConnection,
    query: &LoadQuery,
) -> Result<Vec<macro_features::Model>, PipelineError> {
    let mut find = MacroFeatures::find();
    if let Some(start) = query.start {
        find = find.filter(macro_features::Column::Date.gte(start));
    }
    if let Some(end) = query.end {
        find = find.filter(macro_features::Column::Date.lte(end));
    }
    let order = if query.recent { Order::Desc } else { Order::Asc };
    find = find.order_by(macro_features::Column::Date, order);
    if let Some(limit) = query.limit {
        find = find.limit(limit);
    }

    Ok(find.all(db).await?)
}

/// Snapshot of the primary store, logged after each ingest run.
#[derive(Debug, Clone)]
pub struct StoreSummary {
    pub total_rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub avg_usd_krw: f64,
    pub min_usd_krw: f64,
    pub max_usd_krw: f64,
    /// Windows a sequence model with the given input length and label
    /// horizon could train on
    pub trainable_samples: usize,
    pub train_samples: usize,
    pub test_samples: usize,
}

/// Summarize the store. `None` when the table is empty.
pub async fn store_summary(
    db: &DatabaseConnection,
    time_steps: usize,
    horizon: usize,
) -> Result<Option<StoreSummary>, PipelineError> {
    let rows = load_observations(db, &LoadQuery {
        recent: false,
        ..LoadQuery::default()
    })
    .await?;

    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return Ok(None);
    };

    let total_rows = rows.len();
    let sum: f64 = rows.iter().map(|r| r.usd_krw).sum();
    let min = rows.iter().map(|r| r.usd_krw).fold(f64::INFINITY, f64::min);
    let max = rows
        .iter()
        .map(|r| r.usd_krw)
        .fold(f64::NEG_INFINITY, f64::max);

    let trainable_samples = total_rows.saturating_sub(time_steps + horizon - 1);
    let train_samples = (trainable_samples as f64 * 0.8) as usize;

    Ok(Some(StoreSummary {
        total_rows,
        first_date: first.date,
        last_date: last.date,
        avg_usd_krw: sum / total_rows as f64,
        min_usd_krw: min,
        max_usd_krw: max,
        trainable_samples,
        train_samples,
        test_samples: trainable_samples - train_samples,
    }))
}
