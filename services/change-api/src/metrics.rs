//! Prometheus metrics for the heatmap pipeline.

use std::time::Instant;

use metrics::{counter, histogram};

/// Count one finished request.
pub fn record_request(endpoint: &'static str, outcome: &'static str) {
    counter!("change_requests_total", "endpoint" => endpoint, "outcome" => outcome).increment(1);
}

pub fn record_provider_fetch(seconds: f64) {
    histogram!("provider_fetch_seconds").record(seconds);
}

pub fn record_similarity_compute(seconds: f64) {
    histogram!("similarity_compute_seconds").record(seconds);
}

pub fn record_png_bytes(bytes: usize) {
    histogram!("heatmap_png_bytes").record(bytes as f64);
}

/// Simple timer for measuring durations.
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_micros() as f64 / 1000.0
    }
}
