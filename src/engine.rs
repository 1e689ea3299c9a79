//! Check orchestration
//!
//! ## Message Flow
//!
//! ```text
//! ServiceConfig ─→ resolve type ─→ [worker permit] probe task ─→ CheckResult
//!                      │                                           │
//!                 unknown: skip                  success → AnomalyDetector
//!                                                failure → "System Down"
//!                                                          │
//!                                      SLA grade ─→ DOWN? ─→ AlertSink (spawned)
//!                                                          │
//!                                                   StorageBackend
//! ```
//!
//! Each probe runs in its own task, so a panicking probe is reported as a DOWN
//! result instead of tearing down the batch. Persistence is isolated the same
//! way and a panicking backend only costs the stored copy. Results come back in completion
//! order; the anomaly baseline records samples in that same order.

use std::any::Any;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, instrument, warn};

use crate::alerts::AlertSink;
use crate::anomaly::AnomalyDetector;
use crate::config::{EngineConfig, ServiceConfig};
use crate::monitors::{Probe, ProtocolProbe};
use crate::result::{AnomalyVerdict, CheckResult, ServiceType, SlaStatus};
use crate::storage::StorageBackend;

#[derive(Clone)]
pub struct MonitorEngine {
    probe: Arc<dyn Probe>,
    detector: Arc<AnomalyDetector>,
    storage: Arc<dyn StorageBackend>,
    alerter: Arc<dyn AlertSink>,
    workers: Arc<Semaphore>,
    default_sla_threshold: f64,
}

impl MonitorEngine {
    pub fn new(
        config: &EngineConfig,
        storage: Arc<dyn StorageBackend>,
        alerter: Arc<dyn AlertSink>,
    ) -> Self {
        Self::with_probe(config, storage, alerter, Arc::new(ProtocolProbe))
    }

    /// Create an engine that executes probes through a custom [`Probe`]
    pub fn with_probe(
        config: &EngineConfig,
        storage: Arc<dyn StorageBackend>,
        alerter: Arc<dyn AlertSink>,
        probe: Arc<dyn Probe>,
    ) -> Self {
        Self {
            probe,
            detector: Arc::new(AnomalyDetector::from_config(config)),
            storage,
            alerter,
            workers: Arc::new(Semaphore::new(config.workers.max(1))),
            default_sla_threshold: config.default_sla_threshold,
        }
    }

    /// Check every service concurrently and return one result per resolved service.
    ///
    /// Services with an unknown type are skipped with a warning. The order of
    /// the returned results is unspecified.
    #[instrument(skip_all, fields(services = services.len()))]
    pub async fn run_checks(&self, services: &[ServiceConfig]) -> Vec<CheckResult> {
        let mut tasks = JoinSet::new();

        for service in services {
            let service_type = match service.service_type.parse::<ServiceType>() {
                Ok(service_type) => service_type,
                Err(_) => {
                    warn!(
                        "Unknown service type '{}' for service '{}'",
                        service.service_type, service.name
                    );
                    continue;
                }
            };

            let engine = self.clone();
            let service = service.clone();
            tasks.spawn(async move { engine.check_service(service_type, service).await });
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => error!("service check task failed: {e}"),
            }
        }

        let down = results.iter().filter(|r| r.sla_status == SlaStatus::Down).count();
        info!("completed {} checks ({} down)", results.len(), down);

        results
    }

    #[instrument(skip(self, config), fields(service = %config.name))]
    async fn check_service(&self, service_type: ServiceType, config: ServiceConfig) -> CheckResult {
        let name = config.name.clone();
        let threshold = config.sla_threshold.unwrap_or(self.default_sla_threshold);

        let outcome = {
            let _permit = match self.workers.acquire().await {
                Ok(permit) => Some(permit),
                Err(e) => {
                    error!("worker pool unavailable: {e}");
                    None
                }
            };

            let probe = self.probe.clone();
            tokio::spawn(async move { probe.probe(service_type, config).await }).await
        };

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                let detail = join_error_detail(e);
                error!("Unexpected error checking {name}: {detail}");
                CheckResult::new(
                    &name,
                    service_type,
                    false,
                    0.0,
                    format!("Unexpected Error: {detail}"),
                )
            }
        };

        let result = self.finalize(&name, result, threshold);

        if result.sla_status == SlaStatus::Down {
            let alerter = self.alerter.clone();
            let alert = result.clone();
            tokio::spawn(async move { alerter.alert(&alert).await });
        }

        let storage = self.storage.clone();
        let record = result.clone();
        match tokio::spawn(async move { storage.save_result(&record).await }).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Failed to save result for {name}: {e}"),
            Err(e) => error!("Storage failed while saving {name}: {}", join_error_detail(e)),
        }

        result
    }

    /// Attach the anomaly verdict and the SLA grade to a raw probe result
    fn finalize(&self, name: &str, mut result: CheckResult, threshold: f64) -> CheckResult {
        let verdict = if result.status {
            let verdict = self.detector.analyze(name, result.response_time);
            if verdict.is_anomaly {
                warn!("latency anomaly for {name}: {}", verdict.message);
            }
            verdict
        } else {
            AnomalyVerdict::system_down()
        };
        result.anomaly = Some(verdict);

        result.sla_status = SlaStatus::classify(result.status, result.response_time, threshold);
        if result.sla_status == SlaStatus::Degraded {
            result.message.push_str(&format!(" (Slow: >{threshold}s)"));
        }

        debug!(
            "{name}: {} in {:.4}s - {}",
            result.sla_status, result.response_time, result.message
        );

        result
    }
}

fn join_error_detail(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }

    let payload: Box<dyn Any + Send> = error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "probe panicked".to_string()
    }
}
