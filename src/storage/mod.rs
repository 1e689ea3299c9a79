//! Storage backends for check history
//!
//! The engine hands every finished [`crate::CheckResult`] to a
//! [`StorageBackend`]. Failures are reported back to the engine, which logs
//! them; they never change the result returned to the caller.
//!
//! ## Backends
//!
//! - **Memory** (default): bounded ring buffer per service, no persistence
//! - **SQLite** (`storage-sqlite` feature): embedded database file
//!
//! ## Usage
//!
//! ```no_run
//! use middleware_monitor::storage::{StorageBackend, memory::MemoryBackend};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let backend = MemoryBackend::new();
//! let history = backend.query_latest("billing-api", 20).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::info;

use crate::config::StorageConfig;

pub mod backend;
pub mod error;
pub mod memory;
pub mod schema;
#[cfg(feature = "storage-sqlite")]
pub mod sqlite;

pub use backend::{HealthStatus, StorageBackend};
pub use error::{StorageError, StorageResult};
pub use schema::HistoryRow;

/// Open the backend described by the configuration
pub async fn open_backend(config: &StorageConfig) -> StorageResult<Arc<dyn StorageBackend>> {
    match config {
        StorageConfig::Memory => {
            info!("using in-memory check history");
            Ok(Arc::new(memory::MemoryBackend::new()))
        }
        #[cfg(feature = "storage-sqlite")]
        StorageConfig::Sqlite { path } => Ok(Arc::new(sqlite::SqliteBackend::new(path).await?)),
        #[cfg(not(feature = "storage-sqlite"))]
        StorageConfig::Sqlite { .. } => Err(StorageError::InvalidConfig(
            "sqlite storage requires the 'storage-sqlite' feature".to_string(),
        )),
    }
}
