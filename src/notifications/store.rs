//! Local-first notification store.
//!
//! The collection lives in memory and is the only thing consumers see.
//! Mutations apply immediately, are persisted to the durable slot, and are
//! reported to the backend in the background without waiting for an answer.
//! A single fetch at startup may replace the whole collection with the
//! backend's copy.

use std::future::Future;
use std::sync::{Arc, Weak};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use super::models::{
    Notification, NotificationFilter, NotificationsSnapshot, ReplaceStrategy, SyncStatus,
};
use super::persistence::PersistentStore;
use super::remote::NotificationsRemote;
use super::seed::seed_notifications;

/// Options for opening a [`NotificationStore`].
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Fetch from the backend right after opening.
    pub startup_sync: bool,
    pub replace_strategy: ReplaceStrategy,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            startup_sync: true,
            replace_strategy: ReplaceStrategy::Wholesale,
        }
    }
}

struct StoreInner {
    state: watch::Sender<NotificationsSnapshot>,
    sync_status: watch::Sender<SyncStatus>,
    persistence: PersistentStore,
    remote: Arc<dyn NotificationsRemote>,
    replace_strategy: ReplaceStrategy,
    runtime: Option<Handle>,
    tasks: TaskTracker,
    shutdown: CancellationToken,
}

impl StoreInner {
    /// Apply `modify` to the collection. When it reports a change, the new
    /// collection is persisted and published while the state lock is held, so
    /// the slot sees states in the same order as memory.
    fn update<F>(&self, modify: F) -> bool
    where
        F: FnOnce(&mut Vec<Notification>) -> bool,
    {
        let persistence = &self.persistence;
        self.state.send_if_modified(|snapshot| {
            let mut next = snapshot.as_ref().clone();
            if !modify(&mut next) {
                return false;
            }
            persistence.save(&next);
            *snapshot = Arc::new(next);
            true
        })
    }

    fn apply_remote(&self, fetched: Vec<Notification>) -> SyncStatus {
        if fetched.is_empty() {
            debug!("Backend returned no notifications, keeping local collection");
            return SyncStatus::KeptLocal;
        }

        let count = fetched.len();
        match self.replace_strategy {
            ReplaceStrategy::Wholesale => {
                self.update(move |items| {
                    *items = fetched;
                    true
                });
            }
        }
        info!("Replaced local notifications with {} from backend", count);
        SyncStatus::Replaced { count }
    }
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Handle to the notification store.
///
/// Cloning is cheap and every clone shares the same collection. When the last
/// clone is dropped, a still-running startup fetch is abandoned.
#[derive(Clone)]
pub struct NotificationStore {
    inner: Arc<StoreInner>,
}

impl NotificationStore {
    /// Open the store with default options.
    pub fn open(persistence: PersistentStore, remote: Arc<dyn NotificationsRemote>) -> Self {
        Self::open_with_options(persistence, remote, StoreOptions::default())
    }

    /// Open the store.
    ///
    /// The initial collection comes from the durable slot, or from the seed
    /// set when the slot holds nothing usable. It is available as soon as this
    /// returns. The startup fetch, if enabled, runs on the current tokio
    /// runtime; outside a runtime the store works offline.
    pub fn open_with_options(
        persistence: PersistentStore,
        remote: Arc<dyn NotificationsRemote>,
        options: StoreOptions,
    ) -> Self {
        let initial = match persistence.load() {
            Some(stored) if !stored.is_empty() => {
                info!("Loaded {} notifications from local storage", stored.len());
                stored
            }
            _ => {
                info!("No stored notifications, using seed set");
                seed_notifications()
            }
        };
        persistence.save(&initial);

        let runtime = Handle::try_current().ok();
        if runtime.is_none() {
            warn!("No async runtime available, notifications backend disabled");
        }

        let (state, _) = watch::channel(Arc::new(initial));
        let (sync_status, _) = watch::channel(SyncStatus::Pending);

        let store = Self {
            inner: Arc::new(StoreInner {
                state,
                sync_status,
                persistence,
                remote,
                replace_strategy: options.replace_strategy,
                runtime,
                tasks: TaskTracker::new(),
                shutdown: CancellationToken::new(),
            }),
        };

        if options.startup_sync {
            store.spawn_startup_sync();
        } else {
            store.inner.sync_status.send_replace(SyncStatus::Skipped);
        }

        store
    }

    fn spawn_startup_sync(&self) {
        let Some(runtime) = self.inner.runtime.as_ref() else {
            self.inner.sync_status.send_replace(SyncStatus::Skipped);
            return;
        };

        // Only a weak reference: the fetch must not keep a dropped store alive
        // or write into it.
        let weak: Weak<StoreInner> = Arc::downgrade(&self.inner);
        let remote = self.inner.remote.clone();
        let shutdown = self.inner.shutdown.clone();

        self.inner.tasks.spawn_on(
            async move {
                let result = tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => {
                        debug!("Startup notifications fetch abandoned");
                        return;
                    }
                    result = remote.fetch_all() => result,
                };

                let Some(inner) = weak.upgrade() else {
                    debug!("Store dropped before startup fetch resolved");
                    return;
                };
                if inner.shutdown.is_cancelled() {
                    return;
                }

                let status = match result {
                    Ok(fetched) => inner.apply_remote(fetched),
                    Err(e) => {
                        warn!("Startup notifications fetch failed: {:#}", e);
                        SyncStatus::Failed
                    }
                };
                inner.sync_status.send_replace(status);
            },
            runtime,
        );
    }

    /// Run `call` in the background and discard its outcome.
    fn dispatch<Fut>(&self, label: &'static str, call: Fut)
    where
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let Some(runtime) = self.inner.runtime.as_ref() else {
            debug!("Skipping {}: no async runtime", label);
            return;
        };
        self.inner.tasks.spawn_on(
            async move {
                if let Err(e) = call.await {
                    warn!("{} failed: {:#}", label, e);
                }
            },
            runtime,
        );
    }

    /// Mark one notification as read.
    ///
    /// Unknown ids and already-read notifications leave the collection as is.
    /// The backend is told either way.
    pub fn mark_as_read(&self, id: &str) {
        let changed = self.inner.update(|items| {
            match items.iter_mut().find(|n| n.id == id && !n.is_read) {
                Some(notification) => {
                    notification.is_read = true;
                    true
                }
                None => false,
            }
        });
        if changed {
            debug!("Marked notification {} as read", id);
        }

        let remote = self.inner.remote.clone();
        let id = id.to_string();
        self.dispatch("mark_read", async move { remote.mark_read(&id).await });
    }

    /// Mark every notification as read.
    pub fn mark_all_as_read(&self) {
        let changed = self.inner.update(|items| {
            let mut changed = false;
            for notification in items.iter_mut().filter(|n| !n.is_read) {
                notification.is_read = true;
                changed = true;
            }
            changed
        });
        if changed {
            debug!("Marked all notifications as read");
        }

        let remote = self.inner.remote.clone();
        self.dispatch("mark_all_read", async move { remote.mark_all_read().await });
    }

    /// Number of unread notifications.
    pub fn unread_count(&self) -> usize {
        self.inner.state.borrow().iter().filter(|n| !n.is_read).count()
    }

    /// Current collection, in insertion order.
    pub fn list(&self) -> NotificationsSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Current collection filtered and sorted newest first.
    pub fn view(&self, filter: NotificationFilter) -> Vec<Notification> {
        filter.apply(&self.inner.state.borrow())
    }

    /// Get a notification by id.
    pub fn get(&self, id: &str) -> Option<Notification> {
        self.inner.state.borrow().iter().find(|n| n.id == id).cloned()
    }

    /// Receive every new snapshot of the collection.
    pub fn subscribe(&self) -> watch::Receiver<NotificationsSnapshot> {
        self.inner.state.subscribe()
    }

    /// Watch the outcome of the backend fetches.
    pub fn sync_status(&self) -> watch::Receiver<SyncStatus> {
        self.inner.sync_status.subscribe()
    }

    /// Fetch from the backend now and apply the result like the startup fetch.
    pub async fn refresh(&self) -> SyncStatus {
        if self.inner.shutdown.is_cancelled() {
            return SyncStatus::Skipped;
        }
        let status = match self.inner.remote.fetch_all().await {
            Ok(fetched) => self.inner.apply_remote(fetched),
            Err(e) => {
                warn!("Notifications refresh failed: {:#}", e);
                SyncStatus::Failed
            }
        };
        self.inner.sync_status.send_replace(status);
        status
    }

    /// Wait until every background call dispatched so far has finished.
    pub async fn settle(&self) {
        self.inner.tasks.close();
        self.inner.tasks.wait().await;
        self.inner.tasks.reopen();
    }

    /// Abandon the startup fetch. Local operations keep working.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
        if self.inner.sync_status.borrow().is_pending() {
            self.inner.sync_status.send_replace(SyncStatus::Skipped);
        }
    }
}
