//! REST monitor - GET request with status code validation

use std::time::{Duration, Instant};

use tracing::{debug, error, instrument, warn};

use crate::config::ServiceConfig;
use crate::result::{CheckResult, ServiceType};

use super::{elapsed_secs, http_client, probe_timeout, transport_failure};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct RestMonitor {
    config: ServiceConfig,
}

impl RestMonitor {
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    fn timeout(&self) -> Duration {
        probe_timeout(self.config.timeout, DEFAULT_TIMEOUT)
    }

    #[instrument(skip(self), fields(service = %self.config.name))]
    pub async fn probe(&self) -> CheckResult {
        let start = Instant::now();
        let timeout = self.timeout();

        let Some(url) = self.config.url.as_deref() else {
            return self.result(false, elapsed_secs(start), "Connection Error: no url configured");
        };

        let client = match http_client(timeout, self.config.verify_ssl) {
            Ok(client) => client,
            Err(e) => {
                error!("failed to build HTTP client: {e}");
                return self.result(false, elapsed_secs(start), format!("Connection Error: {e}"));
            }
        };

        debug!("checking REST service: {url}");

        match client.get(url).send().await {
            Ok(response) => {
                let elapsed = elapsed_secs(start);
                let status_code = response.status().as_u16();

                if self.is_expected(status_code) {
                    self.result(true, elapsed, format!("OK (Status: {status_code})"))
                } else {
                    self.result(
                        false,
                        elapsed,
                        format!(
                            "Failed. Expected {}, got {status_code}",
                            self.config.expected_status
                        ),
                    )
                }
            }
            Err(e) => {
                let elapsed = elapsed_secs(start);
                if e.is_timeout() {
                    warn!("timeout connecting to {url}");
                } else {
                    error!("error connecting to {url}: {e}");
                }
                self.result(false, elapsed, transport_failure(&e, timeout))
            }
        }
    }

    /// An exact match always passes; an expected 200 also accepts any 2xx.
    fn is_expected(&self, status_code: u16) -> bool {
        let expected = self.config.expected_status;
        status_code == expected || (expected == 200 && (200..300).contains(&status_code))
    }

    fn result(&self, status: bool, elapsed: f64, message: impl Into<String>) -> CheckResult {
        CheckResult::new(&self.config.name, ServiceType::Rest, status, elapsed, message)
    }
}
