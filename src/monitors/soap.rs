//! SOAP monitor - WSDL reachability check
//!
//! A real check only proves the endpoint is up HTTP-wise by fetching the WSDL
//! (or the plain endpoint URL when no WSDL is configured). Simulation mode
//! skips the network entirely.

use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use crate::config::ServiceConfig;
use crate::result::{CheckResult, ServiceType};

use super::{elapsed_secs, http_client, probe_timeout, transport_failure};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const SIMULATED_LATENCY: Duration = Duration::from_millis(120);

#[derive(Debug, Clone)]
pub struct SoapMonitor {
    config: ServiceConfig,
}

impl SoapMonitor {
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    #[instrument(skip(self), fields(service = %self.config.name))]
    pub async fn probe(&self) -> CheckResult {
        if self.config.simulation_mode {
            self.simulate().await
        } else {
            self.check_endpoint().await
        }
    }

    async fn simulate(&self) -> CheckResult {
        let start = Instant::now();
        tokio::time::sleep(SIMULATED_LATENCY).await;
        let elapsed = elapsed_secs(start);

        info!("simulating SOAP check for {}", self.config.name);

        self.result(true, elapsed, "OK (Simulated WSDL Access)")
    }

    async fn check_endpoint(&self) -> CheckResult {
        let start = Instant::now();
        let timeout = probe_timeout(self.config.timeout, DEFAULT_TIMEOUT);

        let Some(target) = self.config.wsdl.as_deref().or(self.config.url.as_deref()) else {
            return self.result(
                false,
                elapsed_secs(start),
                "Connection Error: no wsdl or url configured",
            );
        };

        let client = match http_client(timeout, self.config.verify_ssl) {
            Ok(client) => client,
            Err(e) => {
                return self.result(false, elapsed_secs(start), format!("Connection Error: {e}"));
            }
        };

        debug!("checking SOAP endpoint availability: {target}");

        match client.get(target).send().await {
            Ok(response) => {
                let elapsed = elapsed_secs(start);
                let status_code = response.status().as_u16();
                if status_code == 200 {
                    self.result(true, elapsed, format!("OK (WSDL Reachable: {status_code})"))
                } else {
                    self.result(false, elapsed, format!("Failed. Status: {status_code}"))
                }
            }
            Err(e) => self.result(false, elapsed_secs(start), transport_failure(&e, timeout)),
        }
    }

    fn result(&self, status: bool, elapsed: f64, message: impl Into<String>) -> CheckResult {
        CheckResult::new(&self.config.name, ServiceType::Soap, status, elapsed, message)
    }
}
