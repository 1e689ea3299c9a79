//! SQLite storage backend implementation
//!
//! - **Embedded**: no separate database server required
//! - **WAL mode**: readers are not blocked by the engine's writes
//! - **Migrations**: schema versioning with sqlx

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info, instrument, warn};

use super::backend::{HealthStatus, StorageBackend};
use super::error::{StorageError, StorageResult};
use super::schema::HistoryRow;
use crate::result::{CheckResult, ServiceType, SlaStatus};

pub struct SqliteBackend {
    pool: Pool<Sqlite>,
    db_path: String,
}

impl SqliteBackend {
    /// Open (or create) the database file and run migrations
    ///
    /// ```no_run
    /// # use middleware_monitor::storage::sqlite::SqliteBackend;
    /// # async fn example() -> anyhow::Result<()> {
    /// let backend = SqliteBackend::new("./monitor.db").await?;
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip_all)]
    pub async fn new(db_path: impl AsRef<Path>) -> StorageResult<Self> {
        let db_path_str = db_path.as_ref().to_string_lossy().to_string();

        info!("initializing SQLite backend at: {}", db_path_str);

        let options = SqliteConnectOptions::new()
            .filename(&db_path_str)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        debug!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self {
            pool,
            db_path: db_path_str,
        })
    }

    fn millis_to_timestamp(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
    }

    fn parse_service_type(value: &str) -> StorageResult<ServiceType> {
        value.parse().map_err(StorageError::QueryFailed)
    }

    fn parse_sla_status(value: &str) -> StorageResult<SlaStatus> {
        match value {
            "HEALTHY" => Ok(SlaStatus::Healthy),
            "DEGRADED" => Ok(SlaStatus::Degraded),
            "DOWN" => Ok(SlaStatus::Down),
            other => Err(StorageError::QueryFailed(format!(
                "unknown sla status '{other}'"
            ))),
        }
    }
}

#[async_trait]
impl StorageBackend for SqliteBackend {
    #[instrument(skip(self, result), fields(service = %result.name))]
    async fn save_result(&self, result: &CheckResult) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO history
                (service_name, service_type, status, response_time, sla_status, message, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&result.name)
        .bind(result.service_type.to_string())
        .bind(result.status)
        .bind(result.response_time)
        .bind(result.sla_status.to_string())
        .bind(&result.message)
        .bind(result.timestamp.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn query_latest(
        &self,
        service_name: &str,
        limit: usize,
    ) -> StorageResult<Vec<HistoryRow>> {
        let rows = sqlx::query(
            r#"
            SELECT service_name, service_type, status, response_time, sla_status, message, timestamp
            FROM history
            WHERE service_name = ?
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(service_name)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut history = rows
            .iter()
            .map(|row| -> StorageResult<HistoryRow> {
                Ok(HistoryRow {
                    service_name: row.try_get("service_name")?,
                    service_type: Self::parse_service_type(row.try_get("service_type")?)?,
                    status: row.try_get("status")?,
                    response_time: row.try_get("response_time")?,
                    sla_status: Self::parse_sla_status(row.try_get("sla_status")?)?,
                    message: row.try_get("message")?,
                    timestamp: Self::millis_to_timestamp(row.try_get("timestamp")?),
                })
            })
            .collect::<StorageResult<Vec<_>>>()?;

        history.reverse();
        Ok(history)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> StorageResult<HealthStatus> {
        match sqlx::query("SELECT 1").fetch_one(&self.pool).await {
            Ok(_) => Ok(HealthStatus {
                healthy: true,
                message: "SQLite backend operational".to_string(),
                metadata: HashMap::from([
                    ("backend".to_string(), "sqlite".to_string()),
                    ("db_path".to_string(), self.db_path.clone()),
                ]),
            }),
            Err(e) => {
                warn!("health check failed: {}", e);
                Ok(HealthStatus {
                    healthy: false,
                    message: format!("health check failed: {}", e),
                    metadata: HashMap::new(),
                })
            }
        }
    }

    async fn close(&self) -> StorageResult<()> {
        info!("closing SQLite backend");
        self.pool.close().await;
        Ok(())
    }
}
