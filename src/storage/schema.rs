//! Stored representation of a check

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::{CheckResult, ServiceType, SlaStatus};

/// One row of check history
///
/// Anomaly verdicts are not persisted: the baseline is rebuilt from live
/// probes after a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub service_name: String,
    pub service_type: ServiceType,
    pub status: bool,
    pub response_time: f64,
    pub sla_status: SlaStatus,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&CheckResult> for HistoryRow {
    fn from(result: &CheckResult) -> Self {
        Self {
            service_name: result.name.clone(),
            service_type: result.service_type,
            status: result.status,
            response_time: result.response_time,
            sla_status: result.sla_status,
            message: result.message.clone(),
            timestamp: result.timestamp,
        }
    }
}
