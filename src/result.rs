//! Canonical outcome of a single probe
//!
//! Every protocol monitor produces a [`CheckResult`]. The engine finalizes the
//! result by attaching the SLA grade and, for successful probes, the verdict
//! of the latency baseline.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Protocol family a service is probed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceType {
    Rest,
    Soap,
    Mq,
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REST" => Ok(ServiceType::Rest),
            "SOAP" => Ok(ServiceType::Soap),
            "MQ" => Ok(ServiceType::Mq),
            other => Err(format!("unknown service type '{other}'")),
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceType::Rest => f.pad("REST"),
            ServiceType::Soap => f.pad("SOAP"),
            ServiceType::Mq => f.pad("MQ"),
        }
    }
}

/// SLA grade of a finished check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SlaStatus {
    Healthy,
    Degraded,
    Down,
}

impl SlaStatus {
    /// Grade a check outcome against an SLA threshold in seconds.
    ///
    /// ```text
    /// status == false                         → Down
    /// status == true, response_time > limit   → Degraded
    /// otherwise                               → Healthy
    /// ```
    pub fn classify(status: bool, response_time: f64, threshold: f64) -> SlaStatus {
        if !status {
            return SlaStatus::Down;
        }

        if response_time > threshold {
            SlaStatus::Degraded
        } else {
            SlaStatus::Healthy
        }
    }
}

impl fmt::Display for SlaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlaStatus::Healthy => f.pad("HEALTHY"),
            SlaStatus::Degraded => f.pad("DEGRADED"),
            SlaStatus::Down => f.pad("DOWN"),
        }
    }
}

/// Judgement of the latency baseline for one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyVerdict {
    pub is_anomaly: bool,
    pub score: f64,
    pub message: String,
}

impl AnomalyVerdict {
    pub fn building_model() -> Self {
        Self::normal("Building Model")
    }

    pub fn optimal() -> Self {
        Self::normal("Optimal")
    }

    /// Verdict attached to failed probes, which never reach the baseline
    pub fn system_down() -> Self {
        Self::normal("System Down")
    }

    pub fn spike(score: f64) -> Self {
        Self {
            is_anomaly: true,
            score,
            message: format!("Latency spike detected (+{score:.1}x deviation)"),
        }
    }

    fn normal(message: &str) -> Self {
        Self {
            is_anomaly: false,
            score: 0.0,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,

    #[serde(rename = "type")]
    pub service_type: ServiceType,

    /// Whether the probe considered the service reachable and correct
    pub status: bool,

    /// Wall-clock duration of the probe in seconds
    pub response_time: f64,

    pub message: String,

    pub timestamp: DateTime<Utc>,

    pub sla_status: SlaStatus,

    /// `None` until the engine has judged the result
    pub anomaly: Option<AnomalyVerdict>,
}

impl CheckResult {
    /// Raw probe outcome, before SLA grading and anomaly analysis
    pub fn new(
        name: impl Into<String>,
        service_type: ServiceType,
        status: bool,
        response_time: f64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            service_type,
            status,
            response_time: round_seconds(response_time),
            message: message.into(),
            timestamp: Utc::now(),
            sla_status: SlaStatus::Down,
            anomaly: None,
        }
    }

    pub fn is_anomaly(&self) -> bool {
        self.anomaly.as_ref().is_some_and(|verdict| verdict.is_anomaly)
    }
}

fn round_seconds(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
