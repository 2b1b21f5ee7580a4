//! Offline helpers for building a forecaster from a closing-price series.

use std::collections::BTreeMap;

/// Supervised samples: each row of `x` holds `look_back` consecutive values
/// and the matching `y` is the value that follows them.
pub fn build_supervised_windows(series: &[f64], look_back: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    if look_back == 0 || series.len() <= look_back {
        return (Vec::new(), Vec::new());
    }

    series
        .windows(look_back + 1)
        .map(|w| (w[..look_back].to_vec(), w[look_back]))
        .unzip()
}

/// Split samples in time order, the first `train_ratio` share going to
/// training. No shuffling: the test set is always the most recent data.
pub fn chronological_split<T: Clone>(samples: &[T], train_ratio: f64) -> (Vec<T>, Vec<T>) {
    let ratio = train_ratio.clamp(0.0, 1.0);
    let split = (samples.len() as f64 * ratio) as usize;
    (samples[..split].to_vec(), samples[split..].to_vec())
}

/// Error metrics on the original price scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastMetrics {
    pub mae: f64,
    pub rmse: f64,
    /// Mean absolute percentage error, in percent
    pub mape: f64,
}

impl ForecastMetrics {
    /// Metric map as stored in model metadata, rounded to 2 decimals
    pub fn to_metadata(&self) -> BTreeMap<String, f64> {
        let round2 = |v: f64| (v * 100.0).round() / 100.0;
        BTreeMap::from([
            ("MAE".to_string(), round2(self.mae)),
            ("RMSE".to_string(), round2(self.rmse)),
            ("MAPE".to_string(), round2(self.mape)),
        ])
    }
}

/// Compare actual and predicted prices pairwise. Returns `None` when there is
/// nothing to compare. Zero actual prices are skipped for MAPE.
pub fn evaluate_forecast(actual: &[f64], predicted: &[f64]) -> Option<ForecastMetrics> {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return None;
    }

    let pairs = actual.iter().zip(predicted.iter()).take(n);
    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    let mut pct_sum = 0.0;
    let mut pct_count = 0usize;

    for (a, p) in pairs {
        let err = a - p;
        abs_sum += err.abs();
        sq_sum += err * err;
        if *a != 0.0 {
            pct_sum += (err / a).abs();
            pct_count += 1;
        }
    }

    let mape = if pct_count > 0 {
        pct_sum / pct_count as f64 * 100.0
    } else {
        0.0
    };

    Some(ForecastMetrics {
        mae: abs_sum / n as f64,
        rmse: (sq_sum / n as f64).sqrt(),
        mape,
    })
}
