//! Backend collaborator for notifications.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use super::codec;
use super::models::Notification;

pub const NOTIFICATIONS_PATH: &str = "/api/notifications";
pub const MARK_READ_PATH: &str = "/api/notifications/mark-read";
pub const MARK_ALL_READ_PATH: &str = "/api/notifications/mark-all-read";

/// Remote source of truth for notifications.
///
/// Every call is best-effort: the store logs failures and moves on.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait NotificationsRemote: Send + Sync {
    /// Fetch the full collection. An empty list is a valid answer.
    async fn fetch_all(&self) -> Result<Vec<Notification>>;

    /// Mark one notification as read. Idempotent on the backend.
    async fn mark_read(&self, id: &str) -> Result<()>;

    /// Mark every notification as read. Idempotent on the backend.
    async fn mark_all_read(&self) -> Result<()>;
}

/// HTTP client for the notifications backend.
pub struct HttpNotificationsRemote {
    client: reqwest::Client,
    base_url: String,
    user_id: Option<String>,
}

impl HttpNotificationsRemote {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - Backend base URL (e.g., "http://127.0.0.1:5000")
    /// * `user_id` - Optional user scope, sent as `?userId=`
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(base_url: String, user_id: Option<String>, timeout_sec: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = base_url.trim().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            user_id,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn user_query(&self) -> Vec<(&'static str, &str)> {
        self.user_id
            .as_deref()
            .map(|id| vec![("userId", id)])
            .unwrap_or_default()
    }

    /// Turn a non-2xx response into an error, preferring the backend's
    /// `{"error": "..."}` message over the bare status.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: Option<serde_json::Value> = response.json().await.ok();
        match body
            .as_ref()
            .and_then(|b| b.get("error"))
            .and_then(|e| e.as_str())
        {
            Some(message) => anyhow::bail!("{} (HTTP {})", message, status.as_u16()),
            None => anyhow::bail!("HTTP {}", status.as_u16()),
        }
    }
}

#[async_trait]
impl NotificationsRemote for HttpNotificationsRemote {
    async fn fetch_all(&self) -> Result<Vec<Notification>> {
        let response = self
            .client
            .get(self.url(NOTIFICATIONS_PATH))
            .query(&self.user_query())
            .send()
            .await
            .context("Failed to connect to notifications backend")?;
        let response = Self::check_status(response).await?;

        let body: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse notifications response")?;

        match body.get("notifications") {
            None | Some(serde_json::Value::Null) => Ok(Vec::new()),
            Some(serde_json::Value::Array(records)) => Ok(codec::decode_records(records)),
            Some(_) => anyhow::bail!("Notifications response field is not an array"),
        }
    }

    async fn mark_read(&self, id: &str) -> Result<()> {
        let response = self
            .client
            .post(self.url(MARK_READ_PATH))
            .json(&serde_json::json!({ "id": id }))
            .send()
            .await
            .with_context(|| format!("Failed to mark notification {} as read", id))?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn mark_all_read(&self) -> Result<()> {
        let response = self
            .client
            .post(self.url(MARK_ALL_READ_PATH))
            .query(&self.user_query())
            .send()
            .await
            .context("Failed to mark all notifications as read")?;
        Self::check_status(response).await?;
        Ok(())
    }
}

/// Backend that has nothing and accepts everything, for offline use.
pub struct NullRemote;

#[async_trait]
impl NotificationsRemote for NullRemote {
    async fn fetch_all(&self) -> Result<Vec<Notification>> {
        Ok(Vec::new())
    }

    async fn mark_read(&self, _id: &str) -> Result<()> {
        Ok(())
    }

    async fn mark_all_read(&self) -> Result<()> {
        Ok(())
    }
}
