use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;

use super::NotificationSink;

/// Sends mail through a JSON email API (`POST {from, to, subject, html}` with a
/// bearer key), the shape used by Resend and similar providers.
pub struct HttpEmailSink {
    api_url: String,
    api_key: String,
    from: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl HttpEmailSink {
    pub fn new(api_url: String, api_key: String, from: String) -> Self {
        Self {
            api_url,
            api_key,
            from,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NotificationSink for HttpEmailSink {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        let payload = EmailPayload {
            from: &self.from,
            to: [to],
            subject,
            html,
        };

        self.client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("failed to reach email API")?
            .error_for_status()
            .context("email API returned error")?;

        Ok(())
    }
}
