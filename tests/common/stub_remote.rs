//! Hand-written remote whose fetch only resolves when the test says so.

use anyhow::Result;
use async_trait::async_trait;
use bistro_notifications::notifications::{Notification, NotificationsRemote};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

/// Remote stub for ordering and cancellation scenarios.
///
/// `fetch_all` blocks until [`GatedRemote::release`] is called, then returns
/// the configured result. Write calls are recorded and fail when
/// `fail_writes` is set.
pub struct GatedRemote {
    gate: Notify,
    fetch_result: Result<Vec<Notification>, String>,
    fail_writes: bool,
    fetch_calls: AtomicUsize,
    fetches_completed: AtomicUsize,
    mark_read_calls: Mutex<Vec<String>>,
    mark_all_read_calls: AtomicUsize,
}

#[allow(dead_code)]
impl GatedRemote {
    pub fn returning(notifications: Vec<Notification>) -> Self {
        Self::new(Ok(notifications), false)
    }

    pub fn failing() -> Self {
        Self::new(Err("connection refused".to_string()), true)
    }

    fn new(result: Result<Vec<Notification>, String>, fail_writes: bool) -> Self {
        Self {
            gate: Notify::new(),
            fetch_result: result,
            fail_writes,
            fetch_calls: AtomicUsize::new(0),
            fetches_completed: AtomicUsize::new(0),
            mark_read_calls: Mutex::new(Vec::new()),
            mark_all_read_calls: AtomicUsize::new(0),
        }
    }

    /// Let one pending (or the next) fetch resolve.
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn fetches_completed(&self) -> usize {
        self.fetches_completed.load(Ordering::SeqCst)
    }

    pub fn mark_read_calls(&self) -> Vec<String> {
        self.mark_read_calls.lock().unwrap().clone()
    }

    pub fn mark_all_read_calls(&self) -> usize {
        self.mark_all_read_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationsRemote for GatedRemote {
    async fn fetch_all(&self) -> Result<Vec<Notification>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        self.fetches_completed.fetch_add(1, Ordering::SeqCst);

        self.fetch_result.clone().map_err(|e| anyhow::anyhow!(e))
    }

    async fn mark_read(&self, id: &str) -> Result<()> {
        self.mark_read_calls.lock().unwrap().push(id.to_string());
        if self.fail_writes {
            anyhow::bail!("HTTP 503");
        }
        Ok(())
    }

    async fn mark_all_read(&self) -> Result<()> {
        self.mark_all_read_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            anyhow::bail!("HTTP 503");
        }
        Ok(())
    }
}
