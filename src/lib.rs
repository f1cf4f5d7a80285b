//! Intake desk engine for a device-repair shop.
//!
//! A three-step wizard (client → device → repair + signature) feeding an
//! offline-tolerant submission pipeline. Everything is headless: field
//! access goes through the form provider, signature capture is a raster
//! the host feeds normalized stroke events, and the remote service sits
//! behind a trait. `AppState` wires the pieces together for a host shell.

pub mod assemble;
pub mod autosave;
pub mod canvas;
pub mod config;
pub mod error;
pub mod export;
pub mod form;
pub mod logging;
pub mod models;
pub mod notifications;
pub mod pclist;
pub mod remote;
pub mod session;
pub mod storage;
pub mod submit;
pub mod validation;
pub mod wizard;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use autosave::AutoSave;
use canvas::{StrokeCanvas, StrokeEvent};
use config::Settings;
use error::AppError;
use form::MemoryForm;
use models::{FormSnapshot, NewPcInput, Ticket};
use notifications::{NotificationService, Severity};
use pclist::{PcListCache, PcSort, PcStats};
use remote::{RemoteClient, RemoteService};
use session::Session;
use storage::{FileStore, SnapshotStore, SNAPSHOT_KEY};
use submit::SubmissionGuard;
use wizard::{KeyAction, KeyInput};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Shared application state: one intake session and the services around it.
pub struct AppState {
    /// Form and session are shared with the auto-save loop.
    pub form: Arc<Mutex<MemoryForm>>,
    pub session: Arc<Mutex<Session>>,
    pub canvas: Mutex<StrokeCanvas>,
    pub notifier: NotificationService,
    /// Remote service client (`None` when no service URL is configured).
    pub remote: Option<Arc<RemoteClient>>,
    pub snapshots: Arc<dyn SnapshotStore>,
    pub pc_list: Mutex<PcListCache>,
    guard: SubmissionGuard,
    /// Host-reported connectivity; submissions fall back to local tickets
    /// while this is false.
    online: AtomicBool,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        let remote = settings
            .service_url
            .as_ref()
            .map(|url| Arc::new(RemoteClient::new(url.clone(), settings.request_timeout)));
        match &remote {
            Some(_) => tracing::info!("Remote service client configured"),
            None => tracing::info!("No service URL configured, running without remote"),
        }

        let session = Session::new();
        tracing::info!(client_number = %session.client_number, "Session started");

        Self {
            form: Arc::new(Mutex::new(MemoryForm::new())),
            session: Arc::new(Mutex::new(session)),
            canvas: Mutex::new(StrokeCanvas::default()),
            notifier: NotificationService::new(),
            remote,
            snapshots: Arc::new(FileStore::new(settings.data_dir.clone())),
            pc_list: Mutex::new(PcListCache::new()),
            guard: SubmissionGuard::new(),
            online: AtomicBool::new(true),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Release);
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    /// The remote service, filtered through the connectivity flag: the
    /// capability check performed before any network attempt.
    fn remote_service(&self) -> Option<&dyn RemoteService> {
        if !self.is_online() {
            return None;
        }
        self.remote.as_deref().map(|c| c as &dyn RemoteService)
    }

    // --------------------------------------------------------------------
    // Wizard
    // --------------------------------------------------------------------

    pub fn advance(&self, target: usize) -> bool {
        let mut form = lock(&self.form);
        let mut session = lock(&self.session);
        wizard::advance(&mut session, &mut form, &self.notifier, target)
    }

    pub fn retreat(&self, target: usize) {
        wizard::retreat(&mut lock(&self.session), target);
    }

    /// Resolve a keyboard intent. `SubmitRequested` is returned for the
    /// caller to run `submit()`, since the pipeline is asynchronous.
    pub fn handle_key(&self, key: KeyInput) -> KeyAction {
        let mut form = lock(&self.form);
        let mut session = lock(&self.session);
        wizard::handle_key(&mut session, &mut form, &self.notifier, key)
    }

    // --------------------------------------------------------------------
    // Form & signature
    // --------------------------------------------------------------------

    /// Field write from the host UI, with the marker relaxation pass.
    pub fn on_field_input(&self, id: &str, value: &str) {
        let mut form = lock(&self.form);
        form::FormDataProvider::set_field(&mut *form, id, value);
        validation::field_edited(&mut form, id);
    }

    /// Loss-of-focus hook: passive re-validation of that field only.
    pub fn on_field_blur(&self, id: &str) {
        validation::field_blurred(&mut lock(&self.form), id);
    }

    pub fn stroke_input(&self, event: StrokeEvent) {
        lock(&self.canvas).handle(event);
    }

    pub fn clear_signature(&self) {
        lock(&self.canvas).clear();
    }

    pub fn scan_imei(&self) -> String {
        form::scan_imei(&mut lock(&self.form))
    }

    /// Raw snapshot of the current form state.
    pub fn form_data(&self) -> FormSnapshot {
        let form = lock(&self.form);
        let session = lock(&self.session);
        assemble::collect_form_data(&form, &session.client_number)
    }

    // --------------------------------------------------------------------
    // Submission & lifecycle
    // --------------------------------------------------------------------

    /// Run the submission pipeline from the final step.
    pub async fn submit(&self) -> Result<Option<Ticket>, AppError> {
        submit::generate_ticket(
            &self.form,
            &self.canvas,
            &self.session,
            &self.notifier,
            self.remote_service(),
            &self.guard,
        )
        .await
    }

    /// New-ticket reset: empty form, blank signature, fresh session.
    pub fn new_ticket(&self) {
        lock(&self.form).reset();
        lock(&self.canvas).clear();
        lock(&self.session).reset();
    }

    // --------------------------------------------------------------------
    // Snapshots
    // --------------------------------------------------------------------

    /// Start the periodic auto-save loop. The caller keeps the handle.
    pub fn start_autosave(&self, interval: Duration) -> AutoSave {
        AutoSave::spawn(
            self.form.clone(),
            self.session.clone(),
            self.snapshots.clone(),
            interval,
        )
    }

    /// Explicit recovery of the last auto-saved snapshot into the form.
    /// Never invoked automatically at startup. Returns false when no
    /// snapshot exists.
    pub fn restore_snapshot(&self) -> Result<bool, AppError> {
        let Some(json) = self.snapshots.get(SNAPSHOT_KEY)? else {
            return Ok(false);
        };
        let snapshot: FormSnapshot = serde_json::from_str(&json)?;

        let mut form = lock(&self.form);
        let mut session = lock(&self.session);
        assemble::restore_form_data(&mut form, &snapshot);
        session.client_number = snapshot.client_number;
        tracing::info!("form snapshot restored");
        Ok(true)
    }

    // --------------------------------------------------------------------
    // Remote flows
    // --------------------------------------------------------------------

    /// Probe the service, reporting the outcome to the operator.
    pub async fn test_connection(&self) -> bool {
        let Some(remote) = self.remote_service() else {
            self.notifier.notify("No connection available.", Severity::Error);
            return false;
        };
        match remote.test_connection().await {
            Ok(info) => {
                if let Some(server) = &info.server_info {
                    tracing::info!(%server, "service reachable");
                }
                self.notifier
                    .notify("Database connection successful!", Severity::Success);
                true
            }
            Err(e) => {
                self.notifier
                    .notify(format!("Connection failed: {e}"), Severity::Error);
                false
            }
        }
    }

    /// Look up an existing ticket and load it into the form.
    pub async fn search_ticket(&self, ticket_number: &str) -> bool {
        let Some(remote) = self.remote_service() else {
            self.notifier.notify("No connection available.", Severity::Error);
            return false;
        };
        export::search_ticket(remote, &self.notifier, &self.form, &self.session, ticket_number)
            .await
    }

    pub async fn load_pc_list(&self) -> Result<usize, AppError> {
        let remote = self
            .remote_service()
            .ok_or_else(|| AppError::Network("No connection available".into()))?;
        let entries = remote.get_pc_list().await?;
        Ok(lock(&self.pc_list).set_entries(entries))
    }

    pub fn filter_pc_list(&self, search: &str, status: Option<&str>) {
        lock(&self.pc_list).filter(search, status);
    }

    pub fn sort_pc_list(&self, key: PcSort) {
        lock(&self.pc_list).sort(key);
    }

    pub fn pc_stats(&self) -> PcStats {
        lock(&self.pc_list).stats()
    }

    /// Add a new PC through the service, then reload the cache.
    pub async fn add_pc(&self, input: &NewPcInput) -> Result<(), AppError> {
        let remote = self
            .remote_service()
            .ok_or_else(|| AppError::Network("No connection available".into()))?;
        pclist::save_new_pc(remote, input).await?;
        self.load_pc_list().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Point;
    use crate::form::{fields, FormDataProvider, Marker};
    use crate::session::View;

    fn offline_app() -> AppState {
        // The store recreates its directory on write, so the TempDir guard
        // can drop here.
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            service_url: None,
            request_timeout: Duration::from_secs(30),
            autosave_interval: Duration::from_secs(30),
            data_dir: dir.path().to_path_buf(),
        };
        AppState::new(&settings)
    }

    fn fill_all_steps(app: &AppState) {
        for (id, value) in [
            (fields::CLIENT_NAME, "Jean Martin"),
            (fields::CLIENT_PHONE, "0612345678"),
            (fields::DEVICE_TYPE, "smartphone"),
            (fields::DEVICE_BRAND, "Acme"),
            (fields::DEVICE_MODEL, "X1"),
            (fields::PROBLEM_DESCRIPTION, "screen cracked"),
            (fields::REPAIR_TYPE, "screen"),
            (fields::ESTIMATED_PRICE, "89.50"),
        ] {
            app.on_field_input(id, value);
        }
    }

    fn sign(app: &AppState) {
        app.stroke_input(StrokeEvent::Begin(Point::new(10.0, 10.0)));
        app.stroke_input(StrokeEvent::Extend(Point::new(60.0, 40.0)));
        app.stroke_input(StrokeEvent::End);
    }

    #[test]
    fn test_field_input_relaxes_invalid_marker() {
        let app = offline_app();
        app.on_field_blur(fields::CLIENT_PHONE);
        assert_eq!(lock(&app.form).marker(fields::CLIENT_PHONE), Marker::Invalid);

        app.on_field_input(fields::CLIENT_PHONE, "0612345678");
        assert_eq!(lock(&app.form).marker(fields::CLIENT_PHONE), Marker::Valid);
    }

    #[tokio::test]
    async fn test_offline_submit_reaches_final_actions() {
        let app = offline_app();
        fill_all_steps(&app);
        sign(&app);
        lock(&app.session).current_step = 3;

        let ticket = app.submit().await.unwrap().expect("ticket expected");
        assert!(ticket.ticket_number.starts_with("MRP"));
        assert!(ticket.error_info.is_none());

        let session = lock(&app.session);
        assert_eq!(session.view, View::FinalActions);
        assert!(session.current_ticket.is_some());
    }

    #[tokio::test]
    async fn test_new_ticket_resets_everything() {
        let app = offline_app();
        fill_all_steps(&app);
        sign(&app);
        lock(&app.session).current_step = 3;
        app.submit().await.unwrap();

        let old_number = lock(&app.session).client_number.clone();
        app.new_ticket();

        let session = lock(&app.session);
        assert_eq!(session.current_step, 1);
        assert_eq!(session.view, View::Form);
        assert!(session.current_ticket.is_none());
        assert_ne!(session.client_number, "");
        drop(session);

        assert_eq!(lock(&app.form).get_field(fields::CLIENT_NAME), "");
        assert!(lock(&app.canvas).is_empty());
        // A fresh number was drawn (same-value collision is possible but
        // the field must at least be regenerated shape-wise).
        assert!(old_number.starts_with("RC"));
    }

    #[test]
    fn test_restore_snapshot_round_trip() {
        let app = offline_app();
        app.on_field_input(fields::CLIENT_NAME, "Alice Durand");
        let snapshot = app.form_data();
        app.snapshots
            .put(SNAPSHOT_KEY, &serde_json::to_string(&snapshot).unwrap())
            .unwrap();

        app.new_ticket();
        assert_eq!(lock(&app.form).get_field(fields::CLIENT_NAME), "");

        assert!(app.restore_snapshot().unwrap());
        assert_eq!(lock(&app.form).get_field(fields::CLIENT_NAME), "Alice Durand");
        assert_eq!(lock(&app.session).client_number, snapshot.client_number);
    }

    #[test]
    fn test_restore_without_snapshot_is_false() {
        let app = offline_app();
        assert!(!app.restore_snapshot().unwrap());
    }

    #[tokio::test]
    async fn test_connection_probe_without_remote_notifies() {
        let app = offline_app();
        assert!(!app.test_connection().await);
        assert_eq!(app.notifier.notices().len(), 1);
    }
}
