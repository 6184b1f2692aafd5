//! Merges the market and rate frames into the 15-field observation
//! frame the incremental store persists.

use chrono::NaiveDate;

use crate::error::PipelineError;
use crate::services::series::DailyFrame;

/// Inner-join market and rate frames on date, derive the interest-rate
/// differential, close any residual gaps and drop rows that still have
/// nulls. Refuses to guess when either connector came back empty.
pub fn integrate(
    market: DailyFrame,
    rates: DailyFrame,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<DailyFrame, PipelineError> {
    if market.is_empty() {
        return Err(PipelineError::ProviderUnavailable {
            connector: "market",
            start,
            end,
        });
    }
    if rates.is_empty() {
        return Err(PipelineError::ProviderUnavailable {
            connector: "rate",
            start,
            end,
        });
    }

    let mut merged = market.inner_join(&rates);

    let ird: Vec<Option<f64>> = (0..merged.len())
        .map(|row| {
            let us = merged.get("us_rate", row)?;
            let kr = merged.get("kr_rate", row)?;
            Some(us - kr)
        })
        .collect();
    merged.push_column("ird", ird);

    merged.interpolate_linear();
    merged.forward_fill();
    merged.backward_fill();
    merged.drop_rows_any_null();

    tracing::info!(
        "Integrated {} days across {} fields",
        merged.len(),
        merged.column_names().len()
    );

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn market_frame() -> DailyFrame {
        DailyFrame::from_series(vec![(
            "usd_krw".to_string(),
            vec![(d(1), 1300.0), (d(2), 1310.0), (d(3), 1305.0)],
        )])
    }

    fn rate_frame() -> DailyFrame {
        DailyFrame::from_series(vec![
            (
                "us_rate".to_string(),
                vec![(d(2), 5.25), (d(3), 5.25), (d(4), 5.25)],
            ),
            (
                "kr_rate".to_string(),
                vec![(d(2), 3.5), (d(3), 3.5), (d(4), 3.5)],
            ),
        ])
    }

    #[test]
    fn joins_on_shared_dates_and_derives_ird() {
        let merged = integrate(market_frame(), rate_frame(), d(1), d(4)).unwrap();

        assert_eq!(merged.dates(), &[d(2), d(3)]);
        assert!((merged.get("ird", 0).unwrap() - 1.75).abs() < 1e-12);
        assert_eq!(merged.get("usd_krw", 1), Some(1305.0));
    }

    #[test]
    fn empty_market_input_is_fatal() {
        let err = integrate(DailyFrame::new(), rate_frame(), d(1), d(4)).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ProviderUnavailable {
                connector: "market",
                ..
            }
        ));
    }

    #[test]
    fn empty_rate_input_is_fatal() {
        let err = integrate(market_frame(), DailyFrame::new(), d(1), d(4)).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ProviderUnavailable {
                connector: "rate",
                ..
            }
        ));
    }
}
