//! One incremental update cycle against the macro_data primary table.
//! Suitable for an external cron-style trigger; exits when done.

use dotenvy::dotenv;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use fxcast_pipeline::config::PipelineConfig;
use fxcast_pipeline::services::forecast::DEFAULT_TIME_STEPS;
use fxcast_pipeline::services::fred::FredService;
use fxcast_pipeline::services::ingest::run_ingest;
use fxcast_pipeline::services::market_data::YahooFinanceService;
use fxcast_pipeline::services::observations::store_summary;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenv().ok();

    let config = PipelineConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;

    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None).await?;

    let market = YahooFinanceService::new(config.yahoo_base_url.clone());
    let rates = FredService::new(config.fred_api_key.clone(), config.fred_base_url.clone());

    let report = run_ingest(&db, &market, &rates, &config).await?;

    if report.no_op {
        tracing::info!("Store already up to date, nothing ingested");
    } else {
        tracing::info!(
            "Ingest complete: {} rows added/updated for window {:?}",
            report.rows_upserted,
            report.window
        );
    }
    tracing::info!(
        "Table state: {} rows, {:?} .. {:?}",
        report.total_rows,
        report.first_date,
        report.last_date
    );

    if let Some(summary) = store_summary(&db, DEFAULT_TIME_STEPS, config.forecast_horizon).await? {
        tracing::info!(
            "Target usd_krw: avg {:.2}, range {:.2} .. {:.2}",
            summary.avg_usd_krw,
            summary.min_usd_krw,
            summary.max_usd_krw
        );
        tracing::info!(
            "Trainable samples (T={}, H={}): {} ({} train / {} test)",
            DEFAULT_TIME_STEPS,
            config.forecast_horizon,
            summary.trainable_samples,
            summary.train_samples,
            summary.test_samples
        );
    }

    Ok(())
}
