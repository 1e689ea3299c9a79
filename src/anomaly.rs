//! Online latency baseline per service
//!
//! Each service owns a bounded window of its most recent successful latencies.
//! A new sample is judged against the mean and sample standard deviation of
//! the window *before* the sample is appended:
//!
//! ```text
//! window.len() < min_samples   → append, "Building Model"
//! stdev = max(stdev, floor)
//! latency > mean + 2 * stdev   → spike, score = (latency - mean) / stdev
//! otherwise                    → "Optimal"
//! append (evicting the oldest sample at capacity)
//! ```
//!
//! Windows live in a [`DashMap`]. `analyze` holds the entry lock for the whole
//! read-compute-append sequence, so calls for the same service are serialized
//! while different services never contend on a shared lock.

use std::collections::VecDeque;

use dashmap::DashMap;
use tracing::trace;

use crate::config::EngineConfig;
use crate::result::AnomalyVerdict;

const SIGMA_MULTIPLIER: f64 = 2.0;

const ZERO_DEVIATION_SCORE: f64 = 10.0;

/// Bounded FIFO of latency samples in seconds
#[derive(Debug, Clone)]
pub struct LatencyHistory {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl LatencyHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, latency: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(latency);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Sample standard deviation (n - 1 denominator)
    pub fn std_dev(&self) -> f64 {
        let n = self.samples.len();
        if n < 2 {
            return 0.0;
        }

        let mean = self.mean();
        let variance = self
            .samples
            .iter()
            .map(|sample| (sample - mean).powi(2))
            .sum::<f64>()
            / (n - 1) as f64;

        variance.sqrt()
    }
}

#[derive(Debug)]
pub struct AnomalyDetector {
    history: DashMap<String, LatencyHistory>,
    capacity: usize,
    min_samples: usize,
    min_deviation: f64,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(20)
    }
}

impl AnomalyDetector {
    pub fn new(capacity: usize) -> Self {
        Self::with_settings(capacity, 5, 0.05)
    }

    pub fn with_settings(capacity: usize, min_samples: usize, min_deviation: f64) -> Self {
        Self {
            history: DashMap::new(),
            capacity: capacity.max(1),
            min_samples,
            min_deviation,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_settings(config.history_size, config.min_samples, config.min_deviation)
    }

    /// Judge `latency` against the service's baseline, then record it.
    pub fn analyze(&self, service_name: &str, latency: f64) -> AnomalyVerdict {
        let mut window = self
            .history
            .entry(service_name.to_string())
            .or_insert_with(|| LatencyHistory::new(self.capacity));

        if window.len() < self.min_samples {
            window.push(latency);
            trace!(
                "{service_name}: warming up baseline ({}/{})",
                window.len(),
                self.min_samples
            );
            return AnomalyVerdict::building_model();
        }

        let mean = window.mean();
        let std_dev = window.std_dev().max(self.min_deviation);
        let threshold = mean + SIGMA_MULTIPLIER * std_dev;

        let verdict = if latency > threshold {
            let score = if std_dev > 0.0 {
                (latency - mean) / std_dev
            } else {
                ZERO_DEVIATION_SCORE
            };
            AnomalyVerdict::spike(score)
        } else {
            AnomalyVerdict::optimal()
        };

        window.push(latency);

        verdict
    }

    /// Number of samples currently held for a service
    pub fn history_len(&self, service_name: &str) -> usize {
        self.history
            .get(service_name)
            .map(|window| window.len())
            .unwrap_or_default()
    }
}
