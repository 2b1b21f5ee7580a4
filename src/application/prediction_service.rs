//! Request-scoped orchestration of a multi-step forecast.
//!
//! Validation happens before the model is touched. Everything after that is
//! an internal failure: it is logged with context and never returns a
//! partial list of predictions.

use crate::application::context::ForecastContext;
use crate::domain::errors::ForecastError;
use crate::domain::window::SlidingWindowPredictor;
use crate::infrastructure::observability::{LatencyGuard, Metrics};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, error, info, warn};

const PREVIEW_LEN: usize = 5;

/// Incoming forecast request
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PredictionRequest {
    pub historical_prices: Vec<f64>,
    /// Defaults to 1 when omitted. Signed so that negative values reach
    /// validation instead of failing deserialization.
    #[serde(default)]
    pub future_steps: Option<i64>,
}

impl PredictionRequest {
    pub fn new(historical_prices: Vec<f64>, future_steps: Option<i64>) -> Self {
        Self {
            historical_prices,
            future_steps,
        }
    }
}

/// Successful forecast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub predictions: Vec<f64>,
    /// Wall-clock seconds from validated input to denormalized output
    pub processing_time: f64,
    pub model_metrics: BTreeMap<String, f64>,
}

pub struct PredictionService {
    context: Arc<ForecastContext>,
    metrics: Metrics,
    max_future_steps: Option<usize>,
}

impl PredictionService {
    pub fn new(context: Arc<ForecastContext>, metrics: Metrics) -> Self {
        metrics.model_look_back.set(context.look_back() as f64);
        Self {
            context,
            metrics,
            max_future_steps: None,
        }
    }

    /// Reject requests asking for more than `cap` steps
    pub fn with_max_future_steps(mut self, cap: Option<usize>) -> Self {
        self.max_future_steps = cap;
        self
    }

    pub fn context(&self) -> &ForecastContext {
        &self.context
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Run a forecast on the calling thread.
    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, ForecastError> {
        let result = self.run(request, None);
        self.record_outcome(&result);
        result
    }

    /// Run a forecast on the blocking pool so CPU-bound inference does not
    /// stall other requests, bounded by `timeout` when given.
    ///
    /// Each request is counted exactly once in `predictions_total`. On
    /// timeout the blocking run is told to stop at its next step; whichever
    /// side flips the shared flag first owns the outcome.
    pub async fn predict_async(
        self: Arc<Self>,
        request: PredictionRequest,
        timeout: Option<Duration>,
    ) -> Result<PredictionResult, ForecastError> {
        let history_len = request.historical_prices.len();
        let settled = Arc::new(AtomicBool::new(false));

        let service = self.clone();
        let flag = settled.clone();
        let task = tokio::task::spawn_blocking(move || service.predict_cancellable(&request, &flag));

        let joined = match timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    let timeout_ms = limit.as_millis() as u64;
                    warn!(
                        "Prediction timed out after {}ms (history_len={})",
                        timeout_ms, history_len
                    );
                    if !settled.swap(true, Ordering::AcqRel) {
                        self.metrics.inc_predictions("timeout");
                    }
                    return Err(ForecastError::Timeout { timeout_ms });
                }
            },
            None => task.await,
        };

        joined.map_err(|e| {
            error!("Prediction task failed to complete: {}", e);
            self.metrics.inc_predictions("internal_error");
            ForecastError::inference("prediction task aborted")
        })?
    }

    fn predict_cancellable(
        &self,
        request: &PredictionRequest,
        settled: &AtomicBool,
    ) -> Result<PredictionResult, ForecastError> {
        if settled.load(Ordering::Acquire) {
            return Err(ForecastError::Cancelled);
        }
        let result = self.run(request, Some(settled));
        if settled.swap(true, Ordering::AcqRel) {
            debug!("Dropping result of a prediction the caller stopped waiting for");
            return Err(ForecastError::Cancelled);
        }
        self.record_outcome(&result);
        result
    }

    fn record_outcome(&self, result: &Result<PredictionResult, ForecastError>) {
        match result {
            Ok(_) => self.metrics.inc_predictions("success"),
            Err(ForecastError::Cancelled) => {}
            Err(e) => self.metrics.inc_predictions(e.code()),
        }
    }

    /// Reject a request before the model is touched.
    ///
    /// History length is checked first, so an empty history with any
    /// `look_back` reports the required count as `InsufficientHistory`
    /// rather than a bare `InvalidInput`.
    fn validate(&self, request: &PredictionRequest) -> Result<usize, ForecastError> {
        let look_back = self.context.look_back();
        let provided = request.historical_prices.len();

        if provided < look_back {
            return Err(ForecastError::InsufficientHistory {
                required: look_back,
                provided,
            });
        }

        let window = &request.historical_prices[provided - look_back..];
        if let Some(pos) = window.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::invalid_input(format!(
                "historical_prices contains a non-finite value at index {}",
                provided - look_back + pos
            )));
        }

        let steps = request.future_steps.unwrap_or(1);
        if steps < 1 {
            return Err(ForecastError::invalid_input(format!(
                "future_steps must be at least 1, got {}",
                steps
            )));
        }
        let steps = usize::try_from(steps)
            .map_err(|_| ForecastError::invalid_input("future_steps is too large"))?;
        if let Some(cap) = self.max_future_steps {
            if steps > cap {
                return Err(ForecastError::invalid_input(format!(
                    "future_steps must be at most {}, got {}",
                    cap, steps
                )));
            }
        }

        Ok(steps)
    }

    fn run(
        &self,
        request: &PredictionRequest,
        cancel: Option<&AtomicBool>,
    ) -> Result<PredictionResult, ForecastError> {
        let steps = self.validate(request)?;
        let guard = LatencyGuard::new(self.metrics.prediction_latency_seconds.clone());

        let look_back = self.context.look_back();
        let prices = &request.historical_prices;
        // Only the trailing window matters to the model; earlier points are ignored
        let window = &prices[prices.len() - look_back..];

        let scaler = self.context.scaler();
        let normalized = scaler.transform(window);

        let forecast = SlidingWindowPredictor::new(self.context.model()).forecast_with(
            &normalized,
            steps,
            |_| match cancel {
                Some(flag) if flag.load(Ordering::Acquire) => ControlFlow::Break(()),
                _ => ControlFlow::Continue(()),
            },
        );
        let normalized_predictions = match forecast {
            Ok(values) => values,
            Err(ForecastError::Cancelled) => {
                guard.discard();
                return Err(ForecastError::Cancelled);
            }
            Err(e) => return Err(self.log_failure(e, request, steps, guard.elapsed())),
        };

        let predictions = scaler.inverse_transform(&normalized_predictions);
        if predictions.iter().any(|v| !v.is_finite()) {
            let e = ForecastError::inference("denormalized prediction is not finite");
            return Err(self.log_failure(e, request, steps, guard.elapsed()));
        }

        let processing_time = guard.finish().as_secs_f64();
        self.metrics.forecast_steps.observe(steps as f64);
        info!(
            "Prediction completed in {:.4} seconds ({} steps)",
            processing_time, steps
        );

        Ok(PredictionResult {
            predictions,
            processing_time,
            model_metrics: self.context.metadata().metrics.clone(),
        })
    }

    fn log_failure(
        &self,
        err: ForecastError,
        request: &PredictionRequest,
        steps: usize,
        elapsed: Duration,
    ) -> ForecastError {
        let prices = &request.historical_prices;
        let preview = &prices[prices.len().saturating_sub(PREVIEW_LEN)..];
        error!(
            "Prediction failed ({}): {} | history_len={} look_back={} future_steps={} elapsed_ms={} tail={:?}",
            err.code(),
            err,
            prices.len(),
            self.context.look_back(),
            steps,
            elapsed.as_millis(),
            preview
        );
        err
    }
}
