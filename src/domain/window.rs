//! Autoregressive multi-step forecasting over a fixed-length window.
//!
//! Each step feeds the previous prediction back in as the most recent
//! observation, so errors compound with the number of steps.

use crate::domain::errors::ForecastError;
use crate::domain::ports::ModelHandle;
use std::collections::VecDeque;
use std::ops::ControlFlow;

/// Rolls a normalized window forward one model prediction at a time.
pub struct SlidingWindowPredictor<'a> {
    model: &'a ModelHandle,
}

impl<'a> SlidingWindowPredictor<'a> {
    pub fn new(model: &'a ModelHandle) -> Self {
        Self { model }
    }

    /// Produce `steps` normalized predictions, oldest step first.
    ///
    /// The caller's window is copied; it is never mutated.
    pub fn forecast(&self, window: &[f64], steps: usize) -> Result<Vec<f64>, ForecastError> {
        self.forecast_with(window, steps, |_| ControlFlow::Continue(()))
    }

    /// Same as [`forecast`](Self::forecast), calling `on_step` with the
    /// window after each shift. Returning `Break` stops the run with
    /// [`ForecastError::Cancelled`] and discards the steps produced so far.
    pub fn forecast_with<F>(
        &self,
        window: &[f64],
        steps: usize,
        mut on_step: F,
    ) -> Result<Vec<f64>, ForecastError>
    where
        F: FnMut(&[f64]) -> ControlFlow<()>,
    {
        if steps == 0 {
            return Err(ForecastError::invalid_input(
                "number of forecast steps must be at least 1",
            ));
        }

        let look_back = window.len();
        let mut current: VecDeque<f64> = window.iter().copied().collect();
        let mut predictions = Vec::with_capacity(steps);

        for _ in 0..steps {
            let prediction = self.model.predict_one(current.make_contiguous())?;
            predictions.push(prediction);

            current.pop_front();
            current.push_back(prediction);
            debug_assert_eq!(current.len(), look_back);

            if on_step(current.make_contiguous()).is_break() {
                return Err(ForecastError::Cancelled);
            }
        }

        Ok(predictions)
    }
}
