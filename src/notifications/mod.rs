//! User notifications module

pub mod codec;
mod models;
mod persistence;
mod remote;
mod seed;
mod slot;
mod store;

pub use codec::{NotificationRecord, RecordError};
pub use models::{
    Notification, NotificationFilter, NotificationType, NotificationsSnapshot, ReplaceStrategy,
    SyncStatus,
};
pub use persistence::{PersistentStore, STORAGE_KEY};
#[cfg(any(test, feature = "mock"))]
pub use remote::MockNotificationsRemote;
pub use remote::{
    HttpNotificationsRemote, NotificationsRemote, NullRemote, MARK_ALL_READ_PATH, MARK_READ_PATH,
    NOTIFICATIONS_PATH,
};
pub use seed::{seed_notifications, seed_notifications_at};
pub use slot::{DurableSlot, MemorySlot, SqliteSlot, StorageError};
pub use store::{NotificationStore, StoreOptions};
