//! Bistro client notification store
//!
//! Local-first notification collection for the restaurant client: persisted in
//! a durable slot, mutated optimistically, reconciled with the backend in the
//! background.

pub mod config;
pub mod notifications;

// Re-export commonly used types for convenience
pub use notifications::{
    HttpNotificationsRemote, Notification, NotificationFilter, NotificationStore,
    NotificationType, NotificationsRemote, PersistentStore, SqliteSlot, SyncStatus,
};
