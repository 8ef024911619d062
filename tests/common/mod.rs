//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::TestBackend;
//!
//! #[tokio::test]
//! async fn test_fetch() {
//!     let backend = TestBackend::spawn().await;
//!     let remote = backend.remote(None);
//!     // open a store against `remote`...
//! }
//! ```

mod backend;
mod constants;
mod stub_remote;

#[allow(unused_imports)]
pub use backend::TestBackend;
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use stub_remote::GatedRemote;

use bistro_notifications::notifications::{
    MemorySlot, NotificationStore, NotificationsRemote, PersistentStore, StoreOptions,
};
use std::sync::Arc;

/// Store over a fresh in-memory slot.
#[allow(dead_code)]
pub fn open_store(remote: Arc<dyn NotificationsRemote>) -> (NotificationStore, PersistentStore) {
    let persistence = PersistentStore::new(Arc::new(MemorySlot::new()));
    let store = NotificationStore::open(persistence.clone(), remote);
    (store, persistence)
}

/// Store over `persistence` that never talks to a backend.
#[allow(dead_code)]
pub fn open_offline(persistence: PersistentStore) -> NotificationStore {
    NotificationStore::open_with_options(
        persistence,
        Arc::new(bistro_notifications::notifications::NullRemote),
        StoreOptions {
            startup_sync: false,
            ..Default::default()
        },
    )
}
