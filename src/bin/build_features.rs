//! One full rebuild of the macro_features derived table from the
//! current contents of macro_data.

use dotenvy::dotenv;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use fxcast_pipeline::config::PipelineConfig;
use fxcast_pipeline::services::features::run_feature_build;

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

    let report = run_feature_build(&db, &config).await?;

    tracing::info!(
        "Feature build complete: {} rows written from {} source rows ({:?} .. {:?})",
        report.rows_written,
        report.source_rows,
        report.first_date,
        report.last_date
    );

    Ok(())
}
