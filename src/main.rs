use repair_intake::config::Settings;
use repair_intake::{logging, AppState};

#[tokio::main]
async fn main() {
    let settings = Settings::load();
    logging::init();

    tracing::info!("Starting repair intake desk v{}", env!("CARGO_PKG_VERSION"));

    let app = AppState::new(&settings);

    if app.remote.is_some() {
        app.test_connection().await;
    }

    let client_number = {
        let session = app.session.lock().unwrap_or_else(|e| e.into_inner());
        session.client_number.clone()
    };

    let autosave = app.start_autosave(settings.autosave_interval);
    tracing::info!(%client_number, "Intake desk ready; hand AppState to the host shell");

    autosave.shutdown().await;
}
