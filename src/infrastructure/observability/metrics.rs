//! Prometheus metrics definitions for Pricecast
//!
//! All metrics use the `pricecast_` prefix.

use prometheus::{
    CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;

/// Prometheus metrics for the prediction service
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Prediction requests by outcome (success, invalid_input, ...)
    pub predictions_total: CounterVec,
    /// End-to-end prediction latency in seconds
    pub prediction_latency_seconds: Histogram,
    /// Requested forecast horizon per successful request
    pub forecast_steps: Histogram,
    /// Window length of the loaded model
    pub model_look_back: GenericGauge<AtomicF64>,
}

impl Metrics {
    /// Create a new Metrics instance with all collectors registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let predictions_total = CounterVec::new(
            Opts::new("pricecast_predictions_total", "Prediction requests by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(predictions_total.clone()))?;

        let prediction_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "pricecast_prediction_latency_seconds",
                "Prediction latency in seconds",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
        )?;
        registry.register(Box::new(prediction_latency_seconds.clone()))?;

        let forecast_steps = Histogram::with_opts(
            HistogramOpts::new("pricecast_forecast_steps", "Requested future steps")
                .buckets(vec![1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0, 365.0]),
        )?;
        registry.register(Box::new(forecast_steps.clone()))?;

        let model_look_back = Gauge::with_opts(Opts::new(
            "pricecast_model_look_back",
            "Window length of the loaded model",
        ))?;
        registry.register(Box::new(model_look_back.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            predictions_total,
            prediction_latency_seconds,
            forecast_steps,
            model_look_back,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    /// Increment the outcome counter
    pub fn inc_predictions(&self, outcome: &str) {
        self.predictions_total.with_label_values(&[outcome]).inc();
    }
}
