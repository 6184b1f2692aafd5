use chrono::NaiveDate;
use thiserror::Error;

/// Failures surfaced to the run's caller. Empty fetch windows and
/// insufficient indicator history are not errors; they are reported
/// through the run reports instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A whole connector came back empty for the requested window.
    /// Fatal to the run; nothing is written.
    #[error("{connector} connector returned no data for {start}..{end}")]
    ProviderUnavailable {
        connector: &'static str,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// A provider answered but the payload could not be used.
    #[error("provider error: {0}")]
    Provider(String),

    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("missing configuration: {0}")]
    Config(&'static str),
}
