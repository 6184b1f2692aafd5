//! Feature builds against an in-memory database seeded straight into
//! the primary table: label construction, warm-up/horizon drops,
//! replace-all semantics and the derived read path.

mod common;

use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{EntityTrait, Set};

use fxcast_pipeline::config::PipelineConfig;
use fxcast_pipeline::entities::{macro_data, prelude::*};
use fxcast_pipeline::services::features::run_feature_build;
use fxcast_pipeline::services::forecast::{assemble_windows, FEATURES_PER_ROW};
use fxcast_pipeline::services::observations::{load_features, store_summary, LoadQuery};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

/// Seed `days` rows whose target follows e^(0.01 i), so every 7-day
/// log-return is exactly 0.07.
async fn seed_store(db: &sea_orm::DatabaseConnection, days: usize) {
    let now = Utc::now().naive_utc();
    let models: Vec<macro_data::ActiveModel> = (0..days)
        .map(|i| {
            let drift = i as f64;
            macro_data::ActiveModel {
                date: Set(base_date() + Duration::days(i as i64)),
                usd_krw: Set((0.01 * drift).exp()),
                wti_price: Set(70.0 + drift),
                sp500_index: Set(5000.0 + drift),
                kospi_index: Set(2600.0 + drift),
                kospi_volatility: Set(0.5),
                usd_jpy: Set(150.0),
                usd_cny: Set(7.2),
                eur_usd: Set(1.08),
                vix: Set(15.0),
                gold: Set(2000.0 + drift),
                dxy: Set(104.0 + drift),
                us_rate: Set(5.25),
                kr_rate: Set(3.5),
                ird: Set(1.75),
                ust_spread: Set(-0.4),
                created_at: Set(Some(now)),
                updated_at: Set(Some(now)),
            }
        })
        .collect();

    for chunk in models.chunks(400) {
        MacroData::insert_many(chunk.to_vec()).exec(db).await.unwrap();
    }
}

#[tokio::test]
async fn labels_match_the_forward_log_return_and_the_tail_is_dropped() {
    let db = common::setup_test_db().await.unwrap();
    let config = PipelineConfig::offline_defaults();
    let days = 80usize;
    seed_store(&db, days).await;

    let report = run_feature_build(&db, &config).await.unwrap();
    assert_eq!(report.source_rows, days);

    let rows = load_features(&db, &LoadQuery {
        recent: false,
        ..LoadQuery::default()
    })
    .await
    .unwrap();
    assert_eq!(rows.len(), report.rows_written);

    // warm-up: first usable row is the 60th; tail: last 7 dates absent
    assert_eq!(rows.first().unwrap().date, base_date() + Duration::days(59));
    assert_eq!(
        rows.last().unwrap().date,
        base_date() + Duration::days(days as i64 - 8)
    );
    for row in &rows {
        assert!((row.target_return - 0.07).abs() < 1e-9);
        assert!(row.rsi >= 0.0 && row.rsi <= 100.0);
    }
}

#[tokio::test]
async fn rebuild_replaces_the_table_without_duplicates() {
    let db = common::setup_test_db().await.unwrap();
    let config = PipelineConfig::offline_defaults();
    seed_store(&db, 90).await;

    let first = run_feature_build(&db, &config).await.unwrap();
    let second = run_feature_build(&db, &config).await.unwrap();

    assert_eq!(first.rows_written, second.rows_written);
    let rows = MacroFeatures::find().all(&db).await.unwrap();
    assert_eq!(rows.len(), second.rows_written);
}

#[tokio::test]
async fn short_history_reports_an_empty_table_without_failing() {
    let db = common::setup_test_db().await.unwrap();
    let config = PipelineConfig::offline_defaults();
    seed_store(&db, config.min_feature_history() - 1).await;

    let report = run_feature_build(&db, &config).await.unwrap();

    assert_eq!(report.rows_written, 0);
    assert_eq!(report.first_date, None);
    assert!(MacroFeatures::find().all(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn feature_rows_assemble_into_model_windows() {
    let db = common::setup_test_db().await.unwrap();
    let config = PipelineConfig::offline_defaults();
    seed_store(&db, 100).await;
    run_feature_build(&db, &config).await.unwrap();

    let rows = load_features(&db, &LoadQuery {
        recent: false,
        ..LoadQuery::default()
    })
    .await
    .unwrap();

    let time_steps = 10;
    let windows = assemble_windows(&rows, time_steps);
    assert_eq!(windows.len(), rows.len() - time_steps);
    assert!(windows
        .iter()
        .all(|w| w.features.len() == time_steps
            && w.features.iter().all(|f| f.len() == FEATURES_PER_ROW)));
    // the first window is labeled by the row right after it
    assert_eq!(windows[0].label, rows[time_steps].target_return);
}

#[tokio::test]
async fn store_summary_reports_range_and_sample_counts() {
    let db = common::setup_test_db().await.unwrap();
    seed_store(&db, 50).await;

    let summary = store_summary(&db, 30, 7).await.unwrap().unwrap();

    assert_eq!(summary.total_rows, 50);
    assert_eq!(summary.first_date, base_date());
    assert_eq!(summary.last_date, base_date() + Duration::days(49));
    // 50 - 30 - 7 + 1
    assert_eq!(summary.trainable_samples, 14);
    assert_eq!(
        summary.train_samples + summary.test_samples,
        summary.trainable_samples
    );
    assert!(summary.min_usd_krw <= summary.avg_usd_krw);
    assert!(summary.avg_usd_krw <= summary.max_usd_krw);

    let empty = common::setup_test_db().await.unwrap();
    assert!(store_summary(&empty, 30, 7).await.unwrap().is_none());
}
