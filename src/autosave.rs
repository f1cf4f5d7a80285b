//! Periodic snapshot of in-progress form data.
//!
//! Best-effort: a failed write is logged and the next tick tries
//! again. The operator is never interrupted over a snapshot.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::assemble::collect_form_data;
use crate::form::MemoryForm;
use crate::session::Session;
use crate::storage::{SnapshotStore, SNAPSHOT_KEY};

/// Handle to a running auto-save loop.
pub struct AutoSave {
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

impl AutoSave {
    /// Spawn the loop. The first snapshot lands one full interval after
    /// start, then repeats on the fixed cadence, unconditionally
    /// overwriting the previous one.
    pub fn spawn(
        form: Arc<Mutex<MemoryForm>>,
        session: Arc<Mutex<Session>>,
        store: Arc<dyn SnapshotStore>,
        interval: Duration,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => save_once(&form, &session, store.as_ref()),
                }
            }
            tracing::debug!("auto-save loop stopped");
        });

        Self { cancel, handle }
    }

    /// Stop the loop and wait for it to wind down.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}

fn save_once(form: &Mutex<MemoryForm>, session: &Mutex<Session>, store: &dyn SnapshotStore) {
    let snapshot = {
        let form = form.lock().unwrap_or_else(|e| e.into_inner());
        let session = session.lock().unwrap_or_else(|e| e.into_inner());
        collect_form_data(&form, &session.client_number)
    };

    let json = match serde_json::to_string(&snapshot) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(error = %e, "auto-save: snapshot serialization failed");
            return;
        }
    };

    match store.put(SNAPSHOT_KEY, &json) {
        Ok(()) => tracing::debug!("auto-save: snapshot written"),
        Err(e) => tracing::warn!(error = %e, "auto-save: snapshot write failed"),
    }
}
