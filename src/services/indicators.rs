//! Rolling-window arithmetic for the feature builder.
//!
//! All functions are trailing-window only: the value at index `i`
//! depends on `values[..=i]`, except `forward_log_return` which is the
//! explicit look-ahead label. A `None` means the window has not warmed
//! up yet (or, for the label, that the future value does not exist).

/// Simple moving average over `window` observations.
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }
    let mut sum: f64 = values[..window].iter().sum();
    out[window - 1] = Some(sum / window as f64);
    for i in window..values.len() {
        sum += values[i] - values[i - window];
        out[i] = Some(sum / window as f64);
    }
    out
}

/// Rolling sample standard deviation (ddof = 1) over `window`
/// observations.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window < 2 {
        return out;
    }
    for i in (window - 1)..values.len() {
        let slice = &values[i + 1 - window..=i];
        let mean = slice.iter().sum::<f64>() / window as f64;
        let var = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
        out[i] = Some(var.sqrt());
    }
    out
}

/// Exponentially weighted moving average with smoothing
/// `alpha = 2 / (span + 1)` and the first value as seed
/// (recursive form, no bias adjustment).
pub fn ewma(values: &[f64], span: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut ema = values[0];
    out.push(ema);
    for &v in &values[1..] {
        ema = alpha * v + (1.0 - alpha) * ema;
        out.push(ema);
    }
    out
}

/// MACD line: fast EWMA minus slow EWMA.
pub fn macd(values: &[f64], fast_span: usize, slow_span: usize) -> Vec<f64> {
    let fast = ewma(values, fast_span);
    let slow = ewma(values, slow_span);
    fast.iter().zip(slow.iter()).map(|(f, s)| f - s).collect()
}

/// Relative strength index over `window` deltas: simple rolling means
/// of gains and of loss magnitudes, mapped onto a 0-100 oscillator.
///
/// A window with no losses would divide by zero; the oscillator is
/// clamped to 100 there (maximal relative strength, and the limit of
/// the expression as losses go to zero).
pub fn rsi(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window + 1 {
        return out;
    }

    let deltas: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    for i in window..values.len() {
        let slice = &deltas[i - window..i];
        let gain: f64 = slice.iter().filter(|d| **d > 0.0).sum::<f64>() / window as f64;
        let loss: f64 = -slice.iter().filter(|d| **d < 0.0).sum::<f64>() / window as f64;
        out[i] = Some(if loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + gain / loss)
        });
    }
    out
}

/// Day-over-day fractional change; undefined at the first index and
/// wherever the previous value is zero.
pub fn pct_change(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    for i in 1..values.len() {
        if let (Some(prev), Some(cur)) = (values[i - 1], values[i]) {
            if prev != 0.0 {
                out[i] = Some((cur - prev) / prev);
            }
        }
    }
    out
}

/// Forward log-return label: `ln(values[i + horizon] / values[i])`.
/// The final `horizon` indices have no future value and stay `None`.
pub fn forward_log_return(values: &[f64], horizon: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if horizon == 0 || values.len() <= horizon {
        return out;
    }
    for i in 0..values.len() - horizon {
        out[i] = Some((values[i + horizon] / values[i]).ln());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_warms_up_then_tracks() {
        let out = sma(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(out, vec![None, None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn rolling_std_uses_sample_variance() {
        let out = rolling_std(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert!((out[2].unwrap() - 1.0).abs() < 1e-12);
        assert!((out[3].unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ewma_is_recursive_from_first_value() {
        // span 3 -> alpha 0.5
        let out = ewma(&[2.0, 4.0, 8.0], 3);
        assert_eq!(out, vec![2.0, 3.0, 5.5]);
    }

    #[test]
    fn macd_is_zero_on_a_flat_series() {
        let flat = vec![5.0; 40];
        for v in macd(&flat, 12, 26) {
            assert!(v.abs() < 1e-12);
        }
    }

    #[test]
    fn rsi_monotone_rise_clamps_to_100() {
        let values: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let out = rsi(&values, 14);
        assert_eq!(out[13], None); // only 13 deltas available
        assert_eq!(out[14], Some(100.0));
        assert_eq!(out[19], Some(100.0));
    }

    #[test]
    fn rsi_balanced_moves_sit_at_50() {
        // Alternate +1/-1: equal average gain and loss
        let mut values = vec![100.0];
        for i in 0..20 {
            let last = *values.last().unwrap();
            values.push(if i % 2 == 0 { last + 1.0 } else { last - 1.0 });
        }
        let out = rsi(&values, 14);
        let mid = out[14].unwrap();
        assert!((mid - 50.0).abs() < 1e-9);
    }

    #[test]
    fn pct_change_skips_zero_denominator() {
        let out = pct_change(&[Some(0.0), Some(5.0), Some(10.0)]);
        assert_eq!(out, vec![None, None, Some(1.0)]);
    }

    #[test]
    fn forward_log_return_matches_definition() {
        // values[i] = e^(0.01 * i): every 7-day log-return is exactly 0.07
        let values: Vec<f64> = (0..10).map(|i| (0.01 * i as f64).exp()).collect();
        let out = forward_log_return(&values, 7);
        for item in out.iter().take(3) {
            assert!((item.unwrap() - 0.07).abs() < 1e-12);
        }
        for item in out.iter().skip(3) {
            assert_eq!(*item, None);
        }
    }
}
