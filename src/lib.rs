pub mod alerts;
pub mod anomaly;
pub mod config;
pub mod engine;
pub mod error;
pub mod monitors;
pub mod result;
pub mod storage;

pub use anomaly::{AnomalyDetector, LatencyHistory};
pub use config::{EngineConfig, MonitorConfig, ServiceConfig};
pub use engine::MonitorEngine;
pub use result::{AnomalyVerdict, CheckResult, ServiceType, SlaStatus};
