use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::json;
use tracing::{error, info, instrument};

use crate::config::{AlertConfig, Webhook};
use crate::result::CheckResult;

/// Receives every result the engine graded as DOWN
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn alert(&self, result: &CheckResult);
}

/// Build the alert sink described by the configuration
pub fn alert_sink(config: &AlertConfig) -> Arc<dyn AlertSink> {
    match config {
        AlertConfig::Log => Arc::new(LogAlerter),
        AlertConfig::Webhook(webhook) => Arc::new(WebhookAlerter::new(webhook.clone())),
    }
}

/// Writes alerts to the log at error level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlerter;

#[async_trait]
impl AlertSink for LogAlerter {
    async fn alert(&self, result: &CheckResult) {
        error!(
            "ALERT: Service {} is DOWN! Msg: {}",
            result.name, result.message
        );
    }
}

#[derive(Debug, Clone)]
pub struct WebhookAlerter {
    client: Client,
    webhook: Webhook,
}

impl WebhookAlerter {
    pub fn new(webhook: Webhook) -> Self {
        Self {
            client: Client::new(),
            webhook,
        }
    }

    fn format_message(result: &CheckResult) -> String {
        format!(
            "🔴 **Service DOWN**: `{}` ({}) is DOWN ({})",
            result.name, result.service_type, result.message
        )
    }
}

#[async_trait]
impl AlertSink for WebhookAlerter {
    #[instrument(skip_all, fields(service = %result.name))]
    async fn alert(&self, result: &CheckResult) {
        let payload = json!({
            "message": Self::format_message(result),
            "service": result.name,
            "type": result.service_type,
            "status": result.sla_status,
            "timestamp": Utc::now().to_rfc3339()
        });

        match self.client.post(&self.webhook.url).json(&payload).send().await {
            Ok(response) => {
                if response.status().is_success() {
                    info!("Successfully sent webhook alert");
                } else {
                    error!("Webhook alert failed with status: {}", response.status());
                }
            }
            Err(e) => {
                error!("Failed to send webhook alert: {}", e);
            }
        }
    }
}
