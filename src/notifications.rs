//! Operator-facing notices.
//!
//! Two surfaces: transient auto-dismissing notices (multiple may coexist,
//! no de-duplication) and a single blocking indicator with idempotent
//! dismiss. The transient lifecycle mirrors the host UI's animation
//! schedule: queued, shown after a short delay, dismissed after a fixed
//! duration, removed after the fade.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;

/// Delay before a queued notice becomes visible.
const SHOW_DELAY: Duration = Duration::from_millis(100);
/// How long a notice stays visible.
const VISIBLE_FOR: Duration = Duration::from_millis(3000);
/// Fade-out time before the notice is removed entirely.
const FADE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub visible: bool,
}

#[derive(Default)]
struct Inner {
    notices: Vec<Notice>,
    next_id: u64,
    blocking: Option<String>,
}

/// Cloneable handle; all clones share the same notice state.
#[derive(Clone, Default)]
pub struct NotificationService {
    inner: Arc<Mutex<Inner>>,
}

impl NotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a transient notice and schedule its show/dismiss cycle.
    /// Outside a runtime the notice simply stays queued (not yet visible).
    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> u64 {
        let message = message.into();
        let id = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.notices.push(Notice {
                id,
                message: message.clone(),
                severity,
                visible: false,
            });
            id
        };

        tracing::debug!(id, ?severity, %message, "notice enqueued");

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let service = self.clone();
            handle.spawn(async move {
                tokio::time::sleep(SHOW_DELAY).await;
                service.set_visible(id, true);
                tokio::time::sleep(VISIBLE_FOR).await;
                service.set_visible(id, false);
                tokio::time::sleep(FADE).await;
                service.remove(id);
            });
        }

        id
    }

    /// Show the blocking indicator, replacing any previous message.
    pub fn notify_blocking(&self, message: impl Into<String>) {
        self.lock().blocking = Some(message.into());
    }

    /// Hide the blocking indicator. No-op when absent.
    pub fn dismiss_blocking(&self) {
        self.lock().blocking = None;
    }

    pub fn blocking(&self) -> Option<String> {
        self.lock().blocking.clone()
    }

    /// Snapshot of all live notices, visible or still queued.
    pub fn notices(&self) -> Vec<Notice> {
        self.lock().notices.clone()
    }

    fn set_visible(&self, id: u64, visible: bool) {
        let mut inner = self.lock();
        if let Some(n) = inner.notices.iter_mut().find(|n| n.id == id) {
            n.visible = visible;
        }
    }

    fn remove(&self, id: u64) {
        self.lock().notices.retain(|n| n.id != id);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
