//! Conversion between stored/wire notification records and in-memory notifications.
//!
//! Records carry `createdAt` as text; in memory it is a `DateTime<Utc>`.
//! Decoding is per-record: a record that fails validation is skipped and the
//! rest of the collection survives.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::models::{Notification, NotificationType};

/// Reasons a single record is rejected during decoding.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Invalid record shape: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("Invalid createdAt timestamp: {0}")]
    Timestamp(String),
}

/// Serialized form of a notification, shared by the durable slot and the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    pub created_at: String,
    pub is_read: bool,
}

impl NotificationRecord {
    pub fn from_notification(notification: &Notification) -> Self {
        Self {
            id: notification.id.clone(),
            notification_type: notification.notification_type,
            title: notification.title.clone(),
            message: notification.message.clone(),
            reference_id: notification.reference_id.clone(),
            created_at: format_timestamp(&notification.created_at),
            is_read: notification.is_read,
        }
    }

    pub fn into_notification(self) -> Result<Notification, RecordError> {
        let created_at = parse_timestamp(&self.created_at)
            .ok_or_else(|| RecordError::Timestamp(self.created_at.clone()))?;

        Ok(Notification {
            id: self.id,
            notification_type: self.notification_type,
            title: self.title,
            message: self.message,
            reference_id: self.reference_id,
            created_at,
            is_read: self.is_read,
        })
    }
}

/// Format an instant the way it is stored: RFC 3339, UTC, millisecond precision.
pub fn format_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored or backend timestamp.
///
/// Accepts RFC 3339 with any offset, and naive ISO 8601 date-times (as
/// emitted by the backend) which are taken to be UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Decode one raw record.
pub fn decode_record(value: &serde_json::Value) -> Result<Notification, RecordError> {
    let record = NotificationRecord::deserialize(value)?;
    record.into_notification()
}

/// Decode a sequence of raw records, skipping the invalid ones.
pub fn decode_records(values: &[serde_json::Value]) -> Vec<Notification> {
    let mut result = Vec::with_capacity(values.len());
    for (index, value) in values.iter().enumerate() {
        match decode_record(value) {
            Ok(notification) => result.push(notification),
            Err(e) => debug!("Skipping notification record #{}: {}", index, e),
        }
    }
    result
}

/// Decode a serialized collection.
///
/// Returns `None` when there is nothing usable at all (empty input, malformed
/// JSON, or a top-level value that is not an array). A valid but empty array
/// yields `Some(vec![])`.
pub fn decode(raw: &str) -> Option<Vec<Notification>> {
    if raw.is_empty() {
        return None;
    }
    let parsed: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            debug!("Stored notifications are not valid JSON: {}", e);
            return None;
        }
    };
    match parsed.as_array() {
        Some(values) => Some(decode_records(values)),
        None => {
            debug!("Stored notifications are not a JSON array");
            None
        }
    }
}

/// Encode a collection into records, one per notification.
pub fn encode(notifications: &[Notification]) -> Vec<NotificationRecord> {
    notifications
        .iter()
        .map(NotificationRecord::from_notification)
        .collect()
}

/// Encode a collection into its serialized text form.
pub fn encode_to_string(notifications: &[Notification]) -> serde_json::Result<String> {
    serde_json::to_string(&encode(notifications))
}
