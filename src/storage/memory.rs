//! In-memory storage backend (no persistence)
//!
//! Keeps a ring buffer of recent checks per service. All data is lost on
//! restart and only the most recent checks are available.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::backend::{HealthStatus, StorageBackend};
use super::error::StorageResult;
use super::schema::HistoryRow;
use crate::result::CheckResult;

/// Maximum checks to keep in memory per service
const MAX_ROWS_PER_SERVICE: usize = 1000;

pub struct MemoryBackend {
    rows: RwLock<HashMap<String, VecDeque<HistoryRow>>>,
    capacity: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_capacity(MAX_ROWS_PER_SERVICE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Total number of stored checks across all services
    pub async fn len(&self) -> usize {
        self.rows.read().await.values().map(VecDeque::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn save_result(&self, result: &CheckResult) -> StorageResult<()> {
        let mut rows = self.rows.write().await;
        let service_rows = rows.entry(result.name.clone()).or_default();

        if service_rows.len() == self.capacity {
            service_rows.pop_front();
        }
        service_rows.push_back(HistoryRow::from(result));

        Ok(())
    }

    async fn query_latest(
        &self,
        service_name: &str,
        limit: usize,
    ) -> StorageResult<Vec<HistoryRow>> {
        debug!("querying latest {limit} checks for {service_name}");

        let rows = self.rows.read().await;
        let latest = rows
            .get(service_name)
            .map(|deque| {
                let skip = deque.len().saturating_sub(limit);
                deque.iter().skip(skip).cloned().collect()
            })
            .unwrap_or_default();

        Ok(latest)
    }

    async fn health_check(&self) -> StorageResult<HealthStatus> {
        Ok(HealthStatus {
            healthy: true,
            message: "In-memory storage operational".to_string(),
            metadata: HashMap::from([
                ("backend".to_string(), "memory".to_string()),
                ("total_checks".to_string(), self.len().await.to_string()),
            ]),
        })
    }

    async fn close(&self) -> StorageResult<()> {
        debug!("closing in-memory backend (no-op)");
        Ok(())
    }
}
