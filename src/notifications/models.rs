//! Notification data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

/// Notification type enum.
///
/// Closed set: unknown values coming from storage or the backend are rejected
/// by the codec rather than mapped to a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Success,
    Pending,
    Failed,
    Info,
}

impl NotificationType {
    pub const ALL: [NotificationType; 4] = [
        NotificationType::Success,
        NotificationType::Pending,
        NotificationType::Failed,
        NotificationType::Info,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Success => "success",
            NotificationType::Pending => "pending",
            NotificationType::Failed => "failed",
            NotificationType::Info => "info",
        }
    }

    pub fn from_wire_str(s: &str) -> Option<Self> {
        match s {
            "success" => Some(NotificationType::Success),
            "pending" => Some(NotificationType::Pending),
            "failed" => Some(NotificationType::Failed),
            "info" => Some(NotificationType::Info),
            _ => None,
        }
    }
}

/// A user notification as held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    /// Free-form order/payment/reservation reference.
    pub reference_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

/// Immutable view of the collection handed out to consumers.
pub type NotificationsSnapshot = Arc<Vec<Notification>>;

/// How a successful remote fetch is reconciled with the local collection.
///
/// Only wholesale replacement exists: the backend result substitutes the
/// whole collection, local read flags included. Field-level merging would
/// change which side owns the data and is intentionally not offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplaceStrategy {
    #[default]
    Wholesale,
}

/// Outcome of the latest remote fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// The startup fetch has not resolved yet.
    Pending,
    /// The backend returned a non-empty collection which replaced the local one.
    Replaced { count: usize },
    /// The backend returned nothing; the local collection stays.
    KeptLocal,
    /// The fetch failed and was absorbed.
    Failed,
    /// No fetch was attempted (disabled, no runtime, or store shut down).
    Skipped,
}

impl SyncStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, SyncStatus::Pending)
    }
}

/// Filter offered to presentation code when listing notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationFilter {
    #[default]
    All,
    Unread,
    Type(NotificationType),
}

impl NotificationFilter {
    pub fn matches(&self, notification: &Notification) -> bool {
        match self {
            NotificationFilter::All => true,
            NotificationFilter::Unread => !notification.is_read,
            NotificationFilter::Type(t) => notification.notification_type == *t,
        }
    }

    /// Filters a collection and orders the result newest first.
    pub fn apply(&self, notifications: &[Notification]) -> Vec<Notification> {
        let mut result: Vec<Notification> = notifications
            .iter()
            .filter(|n| self.matches(n))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result
    }
}

impl FromStr for NotificationFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(NotificationFilter::All),
            "unread" => Ok(NotificationFilter::Unread),
            other => NotificationType::from_wire_str(other)
                .map(NotificationFilter::Type)
                .ok_or_else(|| format!("Unknown notification filter: {}", other)),
        }
    }
}
