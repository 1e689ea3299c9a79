//! Protocol monitors
//!
//! A [`ProtocolMonitor`] is a closed set of probe implementations, one per
//! [`ServiceType`]. Every variant honours the same contract:
//!
//! - `response_time` is the measured wall-clock duration of the probe
//! - transport failures are folded into a `status == false` result, a probe
//!   never returns an error
//!
//! The engine dispatches through the [`Probe`] trait so alternative probe
//! strategies can be injected.

pub mod mq;
pub mod rest;
pub mod soap;

use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::config::ServiceConfig;
use crate::result::{CheckResult, ServiceType};

pub use mq::MqMonitor;
pub use rest::RestMonitor;
pub use soap::SoapMonitor;

#[derive(Debug, Clone)]
pub enum ProtocolMonitor {
    Rest(RestMonitor),
    Soap(SoapMonitor),
    Mq(MqMonitor),
}

impl ProtocolMonitor {
    pub fn new(service_type: ServiceType, config: ServiceConfig) -> Self {
        match service_type {
            ServiceType::Rest => ProtocolMonitor::Rest(RestMonitor::new(config)),
            ServiceType::Soap => ProtocolMonitor::Soap(SoapMonitor::new(config)),
            ServiceType::Mq => ProtocolMonitor::Mq(MqMonitor::new(config)),
        }
    }

    pub async fn probe(&self) -> CheckResult {
        match self {
            ProtocolMonitor::Rest(monitor) => monitor.probe().await,
            ProtocolMonitor::Soap(monitor) => monitor.probe().await,
            ProtocolMonitor::Mq(monitor) => monitor.probe().await,
        }
    }
}

/// Strategy used by the engine to execute one probe
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, service_type: ServiceType, config: ServiceConfig) -> CheckResult;
}

/// Probes services with the built-in protocol monitors
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtocolProbe;

#[async_trait]
impl Probe for ProtocolProbe {
    async fn probe(&self, service_type: ServiceType, config: ServiceConfig) -> CheckResult {
        ProtocolMonitor::new(service_type, config).probe().await
    }
}

/// Build the HTTP client used for a single probe
pub(crate) fn http_client(timeout: Duration, verify_ssl: bool) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .danger_accept_invalid_certs(!verify_ssl)
        .build()
}

/// Configured timeout in seconds, or `default` when unset or not representable
pub(crate) fn probe_timeout(configured: Option<f64>, default: Duration) -> Duration {
    configured
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .filter(|timeout| !timeout.is_zero())
        .unwrap_or(default)
}

/// Fold a transport failure into the message reported for the probe
pub(crate) fn transport_failure(error: &reqwest::Error, timeout: Duration) -> String {
    if error.is_timeout() {
        format!("Connection Timeout ({}s)", timeout.as_secs_f64())
    } else {
        format!("Connection Error: {error}")
    }
}

pub(crate) fn elapsed_secs(start: Instant) -> f64 {
    start.elapsed().as_secs_f64()
}
