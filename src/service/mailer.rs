//! Outbound mail. The service layer only depends on the [`Mailer`] trait;
//! reply dispatch succeeds or fails in one call, with no queue or retry.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use crate::config::MailConfig;
use crate::error::FountainError;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), FountainError>;
}

/// Posts JSON to a transactional mail API with a bearer key.
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: Url,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(client: reqwest::Client, api_url: Url, api_key: String, from: String) -> Self {
        Self {
            client,
            api_url,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), FountainError> {
        let payload = serde_json::json!({
            "from": self.from,
            "to": [to],
            "subject": subject,
            "text": body,
        });
        let resp = self
            .client
            .post(self.api_url.clone())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| FountainError::Mail(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(FountainError::Mail(format!(
                "mail API returned {}",
                resp.status()
            )));
        }
        info!(to = %to, subject = %subject, "reply email dispatched");
        Ok(())
    }
}

/// Development fallback used when no mail API is configured: logs the send
/// and reports success so the inquiry workflow stays exercisable locally.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), FountainError> {
        info!(
            to = %to,
            subject = %subject,
            chars = body.len(),
            "mail API not configured; logging reply instead of sending"
        );
        Ok(())
    }
}

/// Build the mailer the configuration describes.
pub fn from_config(cfg: &MailConfig, client: reqwest::Client) -> Arc<dyn Mailer> {
    match (cfg.api_url.clone(), cfg.api_key.clone()) {
        (Some(url), Some(key)) => Arc::new(HttpMailer::new(client, url, key, cfg.from.clone())),
        _ => {
            warn!("mail API url/key not set; replies will be logged, not delivered");
            Arc::new(LogMailer)
        }
    }
}
