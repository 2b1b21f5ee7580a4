//! Min-max normalization for a single price feature.
//!
//! The fitted state is persisted as JSON by the offline training run and
//! loaded read-only by the server, so it must never be refit per request.

use crate::domain::errors::ForecastError;
use serde::{Deserialize, Serialize};

/// Fitted min-max scaler state.
///
/// Maps `[data_min, data_max]` affinely onto `feature_range`. A zero-width
/// data range uses a unit scale so every value maps to the lower bound of
/// the feature range instead of producing NaN/Inf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub data_min: f64,
    pub data_max: f64,
    #[serde(default = "default_feature_range")]
    pub feature_range: (f64, f64),
    #[serde(default = "default_n_features")]
    pub n_features_in: usize,
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

fn default_n_features() -> usize {
    1
}

impl MinMaxScaler {
    /// Fit on a series using the default `(0, 1)` feature range
    pub fn fit(series: &[f64]) -> Result<Self, ForecastError> {
        Self::fit_with_range(series, default_feature_range())
    }

    pub fn fit_with_range(series: &[f64], feature_range: (f64, f64)) -> Result<Self, ForecastError> {
        if series.is_empty() {
            return Err(ForecastError::invalid_input(
                "cannot fit scaler on an empty series",
            ));
        }
        if let Some(pos) = series.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::invalid_input(format!(
                "cannot fit scaler: non-finite value at index {}",
                pos
            )));
        }

        let data_min = series.iter().cloned().fold(f64::INFINITY, f64::min);
        let data_max = series.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        let scaler = Self {
            data_min,
            data_max,
            feature_range,
            n_features_in: 1,
        };
        scaler.validate().map_err(ForecastError::invalid_input)?;
        Ok(scaler)
    }

    /// Check a (possibly deserialized) state for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        let (lo, hi) = self.feature_range;
        if self.n_features_in != 1 {
            return Err(format!(
                "expected a single-feature scaler, got n_features_in={}",
                self.n_features_in
            ));
        }
        if !(self.data_min.is_finite() && self.data_max.is_finite()) {
            return Err("data_min and data_max must be finite".to_string());
        }
        if self.data_max < self.data_min {
            return Err(format!(
                "data_max ({}) is below data_min ({})",
                self.data_max, self.data_min
            ));
        }
        if !(lo.is_finite() && hi.is_finite()) || lo >= hi {
            return Err(format!("invalid feature_range ({}, {})", lo, hi));
        }
        Ok(())
    }

    fn scale(&self) -> f64 {
        let (lo, hi) = self.feature_range;
        let data_range = self.data_max - self.data_min;
        let data_range = if data_range == 0.0 { 1.0 } else { data_range };
        (hi - lo) / data_range
    }

    fn offset(&self) -> f64 {
        self.feature_range.0 - self.data_min * self.scale()
    }

    pub fn transform_one(&self, value: f64) -> f64 {
        value * self.scale() + self.offset()
    }

    pub fn inverse_transform_one(&self, value: f64) -> f64 {
        (value - self.offset()) / self.scale()
    }

    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.transform_one(v)).collect()
    }

    pub fn inverse_transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.inverse_transform_one(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        let tol = 1e-6 * b.abs().max(1.0);
        assert!((a - b).abs() <= tol, "{} != {}", a, b);
    }

    #[test]
    fn test_fit_computes_bounds() {
        let scaler = MinMaxScaler::fit(&[150.0, 100.0, 200.0, 175.0]).unwrap();
        assert_eq!(scaler.data_min, 100.0);
        assert_eq!(scaler.data_max, 200.0);
        let scaled = scaler.transform(&[100.0, 150.0, 200.0]);
        for (got, want) in scaled.iter().zip([0.0, 0.5, 1.0]) {
            assert_close(*got, want);
        }
    }

    #[test]
    fn test_round_trip_within_fitted_range() {
        let scaler = MinMaxScaler::fit(&[12.5, 97.3, 45.1, 60.0]).unwrap();
        for x in [12.5, 13.0, 33.333, 45.1, 80.75, 97.3] {
            assert_close(scaler.inverse_transform_one(scaler.transform_one(x)), x);
        }
    }

    #[test]
    fn test_custom_feature_range() {
        let scaler = MinMaxScaler::fit_with_range(&[0.0, 10.0], (-1.0, 1.0)).unwrap();
        assert_close(scaler.transform_one(5.0), 0.0);
        assert_close(scaler.transform_one(0.0), -1.0);
        assert_close(scaler.inverse_transform_one(1.0), 10.0);
    }

    #[test]
    fn test_out_of_range_values_extrapolate() {
        let scaler = MinMaxScaler::fit(&[100.0, 200.0]).unwrap();
        assert_close(scaler.transform_one(250.0), 1.5);
        assert_close(scaler.inverse_transform_one(-0.5), 50.0);
    }

    #[test]
    fn test_zero_range_does_not_produce_nan() {
        let scaler = MinMaxScaler::fit(&[42.0, 42.0, 42.0]).unwrap();
        let scaled = scaler.transform(&[42.0]);
        assert_eq!(scaled, vec![0.0]);
        assert_eq!(scaler.inverse_transform(&scaled), vec![42.0]);
        assert!(scaler.transform_one(43.0).is_finite());
    }

    #[test]
    fn test_fit_rejects_empty_and_non_finite() {
        assert!(matches!(
            MinMaxScaler::fit(&[]),
            Err(ForecastError::InvalidInput { .. })
        ));
        assert!(matches!(
            MinMaxScaler::fit(&[1.0, f64::NAN]),
            Err(ForecastError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_state_survives_serialization() {
        let scaler = MinMaxScaler::fit(&[3.25, 9.5, 7.0]).unwrap();
        let json = serde_json::to_string(&scaler).unwrap();
        let restored: MinMaxScaler = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, scaler);
    }

    #[test]
    fn test_validate_rejects_inconsistent_state() {
        let json = r#"{"data_min": 10.0, "data_max": 5.0}"#;
        let scaler: MinMaxScaler = serde_json::from_str(json).unwrap();
        assert!(scaler.validate().is_err());

        let json = r#"{"data_min": 1.0, "data_max": 5.0, "n_features_in": 3}"#;
        let scaler: MinMaxScaler = serde_json::from_str(json).unwrap();
        assert!(scaler.validate().is_err());
    }
}
