//! Failure tests for the check engine
//!
//! These tests verify that failures stay contained:
//! - A panicking probe becomes a DOWN result without aborting the batch
//! - A failing storage backend never changes the returned result
//! - Unreachable endpoints are graded DOWN

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use middleware_monitor::{
    AnomalyVerdict, CheckResult, EngineConfig, MonitorEngine, ServiceConfig, ServiceType,
    SlaStatus,
    alerts::LogAlerter,
    monitors::Probe,
    storage::{HealthStatus, HistoryRow, StorageBackend, StorageError, StorageResult},
};

use crate::helpers::*;

/// Panics for services whose name starts with "explode"
struct ExplodingProbe;

#[async_trait]
impl Probe for ExplodingProbe {
    async fn probe(&self, service_type: ServiceType, config: ServiceConfig) -> CheckResult {
        if config.name.starts_with("explode") {
            panic!("driver crashed");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        CheckResult::new(config.name, service_type, true, 0.02, "OK")
    }
}

struct BrokenStorage;

#[async_trait]
impl StorageBackend for BrokenStorage {
    async fn save_result(&self, _result: &CheckResult) -> StorageResult<()> {
        Err(StorageError::ConnectionFailed("database is gone".to_string()))
    }

    async fn query_latest(
        &self,
        _service_name: &str,
        _limit: usize,
    ) -> StorageResult<Vec<HistoryRow>> {
        Err(StorageError::ConnectionFailed("database is gone".to_string()))
    }

    async fn health_check(&self) -> StorageResult<HealthStatus> {
        Err(StorageError::ConnectionFailed("database is gone".to_string()))
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// Storage whose writes always panic
struct PanickingStorage;

#[async_trait]
impl StorageBackend for PanickingStorage {
    async fn save_result(&self, _result: &CheckResult) -> StorageResult<()> {
        panic!("disk on fire");
    }

    async fn query_latest(
        &self,
        _service_name: &str,
        _limit: usize,
    ) -> StorageResult<Vec<HistoryRow>> {
        Ok(vec![])
    }

    async fn health_check(&self) -> StorageResult<HealthStatus> {
        Err(StorageError::ConnectionFailed("disk on fire".to_string()))
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_panicking_probe_is_isolated() {
    let mut h = harness(EngineConfig::default(), Some(Arc::new(ExplodingProbe)));
    let services = vec![
        ServiceConfig::new("healthy-1", "REST"),
        ServiceConfig::new("explode-now", "SOAP"),
        ServiceConfig::new("healthy-2", "MQ"),
    ];

    let results = h.engine.run_checks(&services).await;
    assert_eq!(results.len(), 3);

    let crashed = find(&results, "explode-now");
    assert!(!crashed.status);
    assert_eq!(crashed.response_time, 0.0);
    assert_eq!(crashed.service_type, ServiceType::Soap);
    assert_eq!(crashed.sla_status, SlaStatus::Down);
    assert!(crashed.message.starts_with("Unexpected Error"));
    assert!(crashed.message.contains("driver crashed"));
    assert_eq!(crashed.anomaly, Some(AnomalyVerdict::system_down()));

    assert!(find(&results, "healthy-1").status);
    assert!(find(&results, "healthy-2").status);

    // The crashed check is still persisted and alerted
    assert_eq!(h.storage.len().await, 3);
    let alerts = drain_alerts(&mut h.alerts, Duration::from_millis(200)).await;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].name, "explode-now");
}

#[tokio::test]
async fn test_storage_failure_does_not_alter_results() {
    let engine = MonitorEngine::new(
        &EngineConfig::default(),
        Arc::new(BrokenStorage),
        Arc::new(LogAlerter),
    );
    let services = vec![simulated_service("queue", "MQ")];

    let results = engine.run_checks(&services).await;

    assert_eq!(results.len(), 1);
    assert!(results[0].status);
    assert_eq!(results[0].sla_status, SlaStatus::Healthy);
}

#[tokio::test]
async fn test_panicking_storage_keeps_results() {
    let (alerter, mut alerts) = RecordingAlerter::new();
    let engine = MonitorEngine::new(
        &EngineConfig::default(),
        Arc::new(PanickingStorage),
        Arc::new(alerter),
    );
    let services = vec![
        simulated_service("queue", "MQ"),
        ServiceConfig::new("broker", "MQ"),
    ];

    let results = engine.run_checks(&services).await;

    assert_eq!(results.len(), 2);
    assert_eq!(find(&results, "queue").sla_status, SlaStatus::Healthy);
    assert_eq!(find(&results, "broker").sla_status, SlaStatus::Down);

    let alerts = drain_alerts(&mut alerts, Duration::from_millis(200)).await;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].name, "broker");
}

#[tokio::test]
async fn test_unreachable_endpoint_is_down() {
    let mut h = harness(EngineConfig::default(), None);
    let services = vec![rest_service("offline", "http://127.0.0.1:9/health".to_string())];

    let results = h.engine.run_checks(&services).await;

    assert_eq!(results[0].sla_status, SlaStatus::Down);
    assert!(results[0].message.starts_with("Connection Error"));
    assert_eq!(results[0].anomaly, Some(AnomalyVerdict::system_down()));
    assert_eq!(drain_alerts(&mut h.alerts, Duration::from_millis(200)).await.len(), 1);
}
