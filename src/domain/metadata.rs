use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Immutable description of the trained model, written next to the model
/// artifact by the training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Number of trailing observations consumed per inference call
    pub look_back: usize,
    /// Evaluation metrics of the trained model (MAE, RMSE, MAPE, ...)
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
}

impl ModelMetadata {
    pub fn new(look_back: usize) -> Self {
        Self {
            stock_symbol: None,
            start_date: None,
            end_date: None,
            look_back,
            metrics: BTreeMap::new(),
        }
    }

    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.look_back == 0 {
            return Err("look_back must be a positive integer".to_string());
        }
        if let Some((name, value)) = self.metrics.iter().find(|(_, v)| !v.is_finite()) {
            return Err(format!("metric {} is not finite ({})", name, value));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(format!("end_date {} precedes start_date {}", end, start));
            }
        }
        Ok(())
    }
}
