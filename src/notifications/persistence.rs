//! Loading and saving the notification collection through a durable slot.
//!
//! Every failure is absorbed here: a broken slot reads as "nothing stored" and
//! a failed write leaves the in-memory collection authoritative.

use std::sync::Arc;
use tracing::{debug, warn};

use super::codec;
use super::models::Notification;
use super::slot::DurableSlot;

/// Slot key for the current persisted format. A format change needs a new key.
pub const STORAGE_KEY: &str = "notifications.v1";

#[derive(Clone)]
pub struct PersistentStore {
    slot: Arc<dyn DurableSlot>,
    key: String,
}

impl PersistentStore {
    pub fn new(slot: Arc<dyn DurableSlot>) -> Self {
        Self::with_key(slot, STORAGE_KEY)
    }

    pub fn with_key(slot: Arc<dyn DurableSlot>, key: impl Into<String>) -> Self {
        Self {
            slot,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored collection, `None` if absent, unreadable or corrupt.
    pub fn load(&self) -> Option<Vec<Notification>> {
        let raw = match self.slot.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No stored notifications under {}", self.key);
                return None;
            }
            Err(e) => {
                warn!("Failed to read stored notifications: {}", e);
                return None;
            }
        };

        let decoded = codec::decode(&raw);
        if decoded.is_none() {
            warn!("Stored notifications under {} are corrupt, ignoring", self.key);
        }
        decoded
    }

    /// Store the collection. Failures are logged and dropped.
    pub fn save(&self, notifications: &[Notification]) {
        let raw = match codec::encode_to_string(notifications) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to encode notifications: {}", e);
                return;
            }
        };

        if let Err(e) = self.slot.write(&self.key, &raw) {
            warn!("Failed to persist {} notifications: {}", notifications.len(), e);
        }
    }
}
