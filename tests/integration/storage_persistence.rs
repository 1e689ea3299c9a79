//! Check history persisted through the SQLite backend

use std::sync::Arc;

use middleware_monitor::{
    EngineConfig, MonitorEngine, ServiceConfig, SlaStatus,
    alerts::LogAlerter,
    config::StorageConfig,
    storage::{StorageBackend, open_backend, sqlite::SqliteBackend},
};

use crate::helpers::*;

#[tokio::test]
async fn test_round_is_written_to_sqlite() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("history.db");
    let backend = Arc::new(SqliteBackend::new(&db_path).await.unwrap());

    let engine =
        MonitorEngine::new(&EngineConfig::default(), backend.clone(), Arc::new(LogAlerter));
    let services = vec![
        simulated_service("queue", "MQ"),
        ServiceConfig::new("broker", "MQ"),
    ];

    engine.run_checks(&services).await;
    engine.run_checks(&services).await;

    let queue = backend.query_latest("queue", 10).await.unwrap();
    assert_eq!(queue.len(), 2);
    assert!(queue.iter().all(|row| row.sla_status == SlaStatus::Healthy));

    let broker = backend.query_latest("broker", 1).await.unwrap();
    assert_eq!(broker.len(), 1);
    assert_eq!(broker[0].sla_status, SlaStatus::Down);
    assert!(!broker[0].status);
}

#[tokio::test]
async fn test_history_survives_reopen() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("history.db");
    let config = StorageConfig::Sqlite { path: path.clone() };

    {
        let backend = open_backend(&config).await.unwrap();
        let engine =
            MonitorEngine::new(&EngineConfig::default(), backend.clone(), Arc::new(LogAlerter));
        engine.run_checks(&[simulated_service("billing", "SOAP")]).await;
        backend.close().await.unwrap();
    }

    let reopened = open_backend(&config).await.unwrap();
    let rows = reopened.query_latest("billing", 5).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].response_time >= 0.12);
}
