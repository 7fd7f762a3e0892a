//! Rolling statistics over one ticker's ordered series.
//!
//! Every helper returns one output per input position. A position whose
//! window is not yet full, or whose result is not finite, yields `None`.

use statrs::statistics::{Data, Distribution};

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Simple return over `lag` periods: `values[t] / values[t - lag] - 1`.
pub fn pct_change(values: &[f64], lag: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|t| {
            if lag == 0 || t < lag {
                return None;
            }
            let prev = values[t - lag];
            if prev == 0.0 {
                return None;
            }
            finite(values[t] / prev - 1.0)
        })
        .collect()
}

/// Sample standard deviation (n - 1) over the trailing `window` values.
///
/// Requires every value in the window to be present.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|t| {
            if window < 2 || t + 1 < window {
                return None;
            }
            let slice: Option<Vec<f64>> = values[t + 1 - window..=t].iter().copied().collect();
            let data = Data::new(slice?);
            data.std_dev().and_then(finite)
        })
        .collect()
}

/// Z-score of each value against the trailing `window` values (current one
/// included). A flat window has no defined z-score.
pub fn rolling_zscore(values: &[f64], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|t| {
            if window < 2 || t + 1 < window {
                return None;
            }
            let data = Data::new(values[t + 1 - window..=t].to_vec());
            let mean = data.mean()?;
            let std_dev = data.std_dev()?;
            if std_dev == 0.0 {
                return None;
            }
            finite((values[t] - mean) / std_dev)
        })
        .collect()
}

/// Mean of every column of a row-major matrix whose rows share one width.
/// An empty or non-finite column averages to 0.
pub fn column_means(rows: &[Vec<f64>]) -> Vec<f64> {
    let width = rows.first().map(Vec::len).unwrap_or(0);
    (0..width)
        .map(|j| {
            let column: Vec<f64> = rows.iter().filter_map(|r| r.get(j).copied()).collect();
            let data = Data::new(column);
            data.mean().and_then(finite).unwrap_or(0.0)
        })
        .collect()
}
