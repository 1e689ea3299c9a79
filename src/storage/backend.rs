//! Storage backend trait definition

use std::collections::HashMap;

use async_trait::async_trait;

use super::error::StorageResult;
use super::schema::HistoryRow;
use crate::result::CheckResult;

/// Health status of the storage backend
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Is the backend operational?
    pub healthy: bool,

    /// Human-readable status message
    pub message: String,

    /// Additional backend-specific metadata
    pub metadata: HashMap<String, String>,
}

/// Persistence collaborator for check results
///
/// Implementations must be `Send + Sync`; the engine calls `save_result`
/// concurrently from its probe tasks.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store one finished check
    async fn save_result(&self, result: &CheckResult) -> StorageResult<()>;

    /// The `limit` most recent checks of a service, oldest first
    async fn query_latest(
        &self,
        service_name: &str,
        limit: usize,
    ) -> StorageResult<Vec<HistoryRow>>;

    /// Lightweight probe of the backend itself
    async fn health_check(&self) -> StorageResult<HealthStatus>;

    /// Release resources and flush pending writes
    async fn close(&self) -> StorageResult<()>;
}
