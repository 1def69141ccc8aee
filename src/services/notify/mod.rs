pub mod http_email;

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::errors::AppError;
use http_email::HttpEmailSink;

/// Outbound email delivery. Callers treat a failed send as non-fatal.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()>;
}

/// Used when no email provider is configured: logs instead of sending.
pub struct LogOnlySink;

#[async_trait]
impl NotificationSink for LogOnlySink {
    async fn send(&self, to: &str, subject: &str, _html: &str) -> anyhow::Result<()> {
        tracing::info!(to = %to, subject = %subject, "email provider not configured, skipping send");
        Ok(())
    }
}

pub fn from_config(config: &AppConfig) -> Result<Box<dyn NotificationSink>, AppError> {
    if config.email_api_key.is_empty() {
        tracing::warn!("EMAIL_API_KEY not set, customer emails will only be logged");
        return Ok(Box::new(LogOnlySink));
    }
    if config.email_from.is_empty() {
        return Err(AppError::Config(
            "EMAIL_FROM must be set when EMAIL_API_KEY is set".to_string(),
        ));
    }

    tracing::info!(url = %config.email_api_url, "using HTTP email provider");
    Ok(Box::new(HttpEmailSink::new(
        config.email_api_url.clone(),
        config.email_api_key.clone(),
        config.email_from.clone(),
    )))
}
