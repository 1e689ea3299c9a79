//! Message queue monitor
//!
//! Only simulation mode is supported: connecting to a real broker requires a
//! vendor client, so a non-simulated check reports the service as down.

use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{info, instrument};

use crate::config::ServiceConfig;
use crate::result::{CheckResult, ServiceType};

use super::elapsed_secs;

const SIMULATED_LATENCY: Duration = Duration::from_millis(50);

const MAX_SIMULATED_DEPTH: u64 = 50;

#[derive(Debug, Clone)]
pub struct MqMonitor {
    config: ServiceConfig,
}

impl MqMonitor {
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    #[instrument(skip(self), fields(service = %self.config.name))]
    pub async fn probe(&self) -> CheckResult {
        let start = Instant::now();

        if !self.config.simulation_mode {
            return self.result(
                false,
                elapsed_secs(start),
                "Real MQ check not implemented (requires a broker client)",
            );
        }

        let host = self.config.host.as_deref().unwrap_or("localhost");
        let port = self.config.port.unwrap_or(1414);
        let queue = self.config.queue_name.as_deref().unwrap_or("UNKNOWN.Q");

        info!("simulating MQ check for {host}:{port} ({queue})");

        tokio::time::sleep(SIMULATED_LATENCY).await;
        let elapsed = elapsed_secs(start);

        let depth = rand::thread_rng().gen_range(0..=MAX_SIMULATED_DEPTH);

        self.evaluate_depth(depth, elapsed)
    }

    fn evaluate_depth(&self, depth: u64, elapsed: f64) -> CheckResult {
        if depth < self.config.max_queue_depth {
            self.result(true, elapsed, format!("OK (Connected, Depth: {depth})"))
        } else {
            self.result(false, elapsed, format!("Warning (Depth High: {depth})"))
        }
    }

    fn result(&self, status: bool, elapsed: f64, message: impl Into<String>) -> CheckResult {
        CheckResult::new(&self.config.name, ServiceType::Mq, status, elapsed, message)
    }
}
