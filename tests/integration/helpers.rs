//! Helper functions for integration tests

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use middleware_monitor::{
    CheckResult, EngineConfig, MonitorEngine, ServiceConfig,
    alerts::AlertSink,
    monitors::Probe,
    storage::{StorageBackend, memory::MemoryBackend},
};
use tokio::sync::{Mutex, mpsc};
use tracing_subscriber::fmt::MakeWriter;

pub fn rest_service(name: &str, url: String) -> ServiceConfig {
    let mut config = ServiceConfig::new(name, "REST");
    config.url = Some(url);
    config.timeout = Some(2.0);
    config
}

pub fn simulated_service(name: &str, service_type: &str) -> ServiceConfig {
    let mut config = ServiceConfig::new(name, service_type);
    config.simulation_mode = true;
    config
}

/// Alert sink that forwards every alert into a channel
pub struct RecordingAlerter {
    sender: mpsc::UnboundedSender<CheckResult>,
}

impl RecordingAlerter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<CheckResult>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl AlertSink for RecordingAlerter {
    async fn alert(&self, result: &CheckResult) {
        let _ = self.sender.send(result.clone());
    }
}

/// Formatted log output captured on the current thread
#[derive(Clone, Default)]
pub struct CapturedLogs {
    buffer: Arc<std::sync::Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    /// Route this thread's events into the buffer until the guard is dropped
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Collect every alert that arrives within `wait`
pub async fn drain_alerts(
    receiver: &mut mpsc::UnboundedReceiver<CheckResult>,
    wait: Duration,
) -> Vec<CheckResult> {
    let mut alerts = vec![];
    while let Ok(Some(alert)) = tokio::time::timeout(wait, receiver.recv()).await {
        alerts.push(alert);
    }
    alerts
}

/// Probe that replays a scripted latency per call and never touches the network
pub struct ScriptedProbe {
    latencies: Mutex<Vec<f64>>,
}

impl ScriptedProbe {
    pub fn new(latencies: Vec<f64>) -> Self {
        Self {
            latencies: Mutex::new(latencies),
        }
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn probe(
        &self,
        service_type: middleware_monitor::ServiceType,
        config: ServiceConfig,
    ) -> CheckResult {
        let mut latencies = self.latencies.lock().await;
        let latency = if latencies.is_empty() {
            0.1
        } else {
            latencies.remove(0)
        };
        CheckResult::new(config.name, service_type, true, latency, "OK (scripted)")
    }
}

pub struct Harness {
    pub engine: MonitorEngine,
    pub storage: Arc<MemoryBackend>,
    pub alerts: mpsc::UnboundedReceiver<CheckResult>,
}

pub fn harness(config: EngineConfig, probe: Option<Arc<dyn Probe>>) -> Harness {
    let storage = Arc::new(MemoryBackend::new());
    let (alerter, alerts) = RecordingAlerter::new();
    let backend: Arc<dyn StorageBackend> = storage.clone();

    let engine = match probe {
        Some(probe) => MonitorEngine::with_probe(&config, backend, Arc::new(alerter), probe),
        None => MonitorEngine::new(&config, backend, Arc::new(alerter)),
    };

    Harness {
        engine,
        storage,
        alerts,
    }
}

pub fn find<'a>(results: &'a [CheckResult], name: &str) -> &'a CheckResult {
    results
        .iter()
        .find(|result| result.name == name)
        .unwrap_or_else(|| panic!("no result for {name}"))
}
