use prometheus::Histogram;
use std::time::{Duration, Instant};

/// Times one forecast and records it in the latency histogram.
///
/// The sample is taken once: by [`finish`](Self::finish) on success, or on
/// drop when the forecast fails part way. A run nobody will read the result
/// of is [`discard`](Self::discard)ed so it never skews the histogram.
pub struct LatencyGuard {
    start: Instant,
    histogram: Option<Histogram>,
}

impl LatencyGuard {
    pub fn new(histogram: Histogram) -> Self {
        Self {
            start: Instant::now(),
            histogram: Some(histogram),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Record the sample now and return the duration that was recorded
    pub fn finish(mut self) -> Duration {
        let elapsed = self.start.elapsed();
        if let Some(histogram) = self.histogram.take() {
            histogram.observe(elapsed.as_secs_f64());
        }
        elapsed
    }

    pub fn discard(mut self) {
        self.histogram = None;
    }
}

impl Drop for LatencyGuard {
    fn drop(&mut self) {
        if let Some(histogram) = self.histogram.take() {
            histogram.observe(self.start.elapsed().as_secs_f64());
        }
    }
}
